use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DeltaConsumer;
use crate::geometry::Point;
use crate::graph::{EdgeId, GraphDelta, GraphState};

/// Copper properties of one trace segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStyle {
    /// Width in mm.
    pub width: f64,
    pub layer: String,
}

impl TraceStyle {
    pub fn new(width: f64, layer: impl Into<String>) -> Self {
        Self {
            width,
            layer: layer.into(),
        }
    }
}

impl Default for TraceStyle {
    fn default() -> Self {
        Self::new(0.25, "F.Cu")
    }
}

/// Per-edge trace styles that follow the graph through splits and merges.
///
/// Edge ids survive rewiring, so only created edges need a decision: they
/// inherit from the deleted edge they overlap the most (the segment they were
/// split from or merged out of), else they get the default style.
#[derive(Debug, Clone)]
pub struct TraceStore {
    styles: BTreeMap<EdgeId, TraceStyle>,
    default_style: TraceStyle,
    tolerance: f64,
    previous: Option<Arc<GraphState>>,
}

impl TraceStore {
    pub fn new(default_style: TraceStyle) -> Self {
        Self {
            styles: BTreeMap::new(),
            default_style,
            tolerance: 0.01,
            previous: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn default_style(&self) -> &TraceStyle {
        &self.default_style
    }

    pub fn style_of(&self, edge: EdgeId) -> Option<&TraceStyle> {
        self.styles.get(&edge)
    }

    pub fn set_style(&mut self, edge: EdgeId, style: TraceStyle) {
        self.styles.insert(edge, style);
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeId, &TraceStyle)> {
        self.styles.iter()
    }

    /// Deleted edge that best explains `segment`, with its style.
    fn ancestor_style(
        &self,
        segment: (Point, Point),
        deleted: &[(EdgeId, (Point, Point), TraceStyle)],
    ) -> Option<TraceStyle> {
        deleted
            .iter()
            .filter_map(|(id, old, style)| {
                collinear_overlap(segment, *old, self.tolerance).map(|len| (len, *id, style))
            })
            // longest overlap, then oldest edge
            .max_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, _, style)| style.clone())
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new(TraceStyle::default())
    }
}

impl DeltaConsumer for TraceStore {
    fn apply_delta(&mut self, delta: &GraphDelta, state: &Arc<GraphState>) {
        let deleted: Vec<_> = delta
            .deleted_edges
            .iter()
            .filter_map(|id| {
                let style = self.styles.remove(id)?;
                let segment = self.previous.as_ref()?.edge_segment(*id)?;
                Some((*id, segment, style))
            })
            .collect();

        let mut inherited = 0;
        for id in &delta.created_edges {
            let Some(segment) = state.edge_segment(*id) else {
                continue;
            };
            let style = match self.ancestor_style(segment, &deleted) {
                Some(style) => {
                    inherited += 1;
                    style
                }
                None => self.default_style.clone(),
            };
            self.styles.insert(*id, style);
        }

        if !delta.created_edges.is_empty() || !deleted.is_empty() {
            tracing::debug!(
                "Trace styles: {} created ({} inherited), {} dropped",
                delta.created_edges.len(),
                inherited,
                deleted.len()
            );
        }
        self.previous = Some(Arc::clone(state));
    }
}

/// Length over which two segments lie on the same line, if they do and the
/// overlap is longer than `tolerance`.
fn collinear_overlap(a: (Point, Point), b: (Point, Point), tolerance: f64) -> Option<f64> {
    let (dx, dy) = (a.1.x - a.0.x, a.1.y - a.0.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len < tolerance {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let off_line = |p: &Point| ((p.x - a.0.x) * uy - (p.y - a.0.y) * ux).abs();
    if off_line(&b.0) >= tolerance || off_line(&b.1) >= tolerance {
        return None;
    }
    let along = |p: &Point| (p.x - a.0.x) * ux + (p.y - a.0.y) * uy;
    let (t0, t1) = (along(&b.0), along(&b.1));
    let overlap = len.min(t0.max(t1)) - 0.0_f64.max(t0.min(t1));
    (overlap > tolerance).then_some(overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_collinear_overlap() {
        let long = (p(0.0, 0.0), p(10.0, 0.0));
        assert_eq!(collinear_overlap(long, (p(4.0, 0.0), p(10.0, 0.0)), 0.01), Some(6.0));
        assert_eq!(collinear_overlap(long, (p(12.0, 0.0), p(8.0, 0.0)), 0.01), Some(2.0));
        // touching at a single point
        assert_eq!(collinear_overlap(long, (p(10.0, 0.0), p(20.0, 0.0)), 0.01), None);
        // parallel but offset
        assert_eq!(collinear_overlap(long, (p(0.0, 1.0), p(10.0, 1.0)), 0.01), None);
        // perpendicular
        assert_eq!(collinear_overlap(long, (p(5.0, 0.0), p(5.0, 5.0)), 0.01), None);
    }

    #[test]
    fn test_split_edges_inherit_style() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Default::default(), None);
        let b = state.add_vertex(p(10.0, 0.0), Default::default(), None);
        let edge = state.add_edge(a, b).unwrap();
        let before = Arc::new(state.clone());

        let mut store = TraceStore::default();
        store.apply_delta(&GraphDelta::between(&GraphState::new(), &before), &before);
        let wide = TraceStyle::new(1.0, "B.Cu");
        store.set_style(edge, wide.clone());

        state.split_edge(edge, p(4.0, 0.0));
        let after = Arc::new(state);
        store.apply_delta(&GraphDelta::between(&before, &after), &after);

        assert_eq!(store.len(), 2);
        assert!(store.style_of(edge).is_none());
        assert!(store.iter().all(|(_, style)| *style == wide));
    }
}
