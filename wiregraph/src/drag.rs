//! Drag preview sessions.
//!
//! While the mouse moves, each update re-runs the drag from the state captured
//! at `begin` (so error never accumulates) and keeps the normalized result as
//! a preview. Nothing reaches the engine until `commit`; dropping the session
//! cancels it.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::engine::{Engine, Outcome};
use crate::geometry::Point;
use crate::graph::{GraphDelta, GraphState, VertexId};
use crate::transactions::{DragVertices, LoadState};

pub struct DragSession {
    base: Arc<GraphState>,
    vertices: BTreeSet<VertexId>,
    snap: bool,
    preview: Option<Outcome>,
}

impl DragSession {
    pub fn begin(engine: &Engine, vertices: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            base: Arc::clone(engine.state()),
            vertices: vertices.into_iter().collect(),
            snap: false,
            preview: None,
        }
    }

    /// Snap the drag offset to the grid on every update.
    pub fn snapped(mut self) -> Self {
        self.snap = true;
        self
    }

    /// Recompute the preview for the total offset since `begin`.
    pub fn update(&mut self, engine: &Engine, offset: Point) -> &Outcome {
        let drag = DragVertices {
            vertices: self.vertices.clone(),
            offset,
            snap: self.snap,
        };
        self.preview.insert(engine.preview_from(&self.base, &drag))
    }

    pub fn preview(&self) -> Option<&Outcome> {
        self.preview.as_ref()
    }

    /// Commit the latest preview. A session that was never updated commits
    /// nothing.
    pub fn commit(self, engine: &mut Engine) -> GraphDelta {
        let Some(preview) = self.preview else {
            return GraphDelta::default();
        };
        if !Arc::ptr_eq(&self.base, engine.state()) {
            tracing::warn!("Graph changed during drag; the drag result replaces those changes");
        }
        let epicenter = preview.epicenter.vertices;
        engine.execute(&LoadState::new(preview.state, epicenter))
    }
}
