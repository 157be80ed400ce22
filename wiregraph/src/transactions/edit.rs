use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::connect::connect_resolved;
use super::{Epicenter, Transaction};
use crate::geometry::{GeometryPolicy, Orientation, Point};
use crate::graph::{EdgeId, GraphState, Ownership, VertexId};

/// Remove a selection of edges and vertices.
///
/// Deleting never reconnects anything; the survivors next to the hole become
/// the epicenter so straight runs can collapse and orphans can be culled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteItems {
    #[serde(default)]
    pub vertices: BTreeSet<VertexId>,
    #[serde(default)]
    pub edges: BTreeSet<EdgeId>,
}

impl DeleteItems {
    pub fn vertices(vertices: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            vertices: vertices.into_iter().collect(),
            edges: BTreeSet::new(),
        }
    }

    pub fn edges(edges: impl IntoIterator<Item = EdgeId>) -> Self {
        Self {
            vertices: BTreeSet::new(),
            edges: edges.into_iter().collect(),
        }
    }
}

impl Transaction for DeleteItems {
    fn name(&self) -> &str {
        "delete_items"
    }

    fn apply(&self, state: &mut GraphState, _policy: &GeometryPolicy) -> Epicenter {
        let mut recheck = Epicenter::none();

        for &edge in &self.edges {
            if let Some(removed) = state.remove_edge(edge) {
                recheck.insert(removed.start);
                recheck.insert(removed.end);
            }
        }

        for &vertex in &self.vertices {
            let neighbors = state.neighbors(vertex);
            if state.remove_vertex(vertex).is_some() {
                recheck.vertices.extend(neighbors);
            }
        }

        recheck.vertices.retain(|v| state.contains_vertex(*v));
        recheck
    }
}

/// Relocate one vertex. Displacements below tolerance are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveVertex {
    pub vertex: VertexId,
    pub to: Point,
    #[serde(default)]
    pub snap: bool,
}

impl MoveVertex {
    pub fn new(vertex: VertexId, to: Point) -> Self {
        Self {
            vertex,
            to,
            snap: false,
        }
    }

    pub fn snapped(mut self) -> Self {
        self.snap = true;
        self
    }
}

impl Transaction for MoveVertex {
    fn name(&self) -> &str {
        "move_vertex"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        let target = if self.snap { policy.snap(self.to) } else { self.to };
        let Some(current) = state.position(self.vertex) else {
            return Epicenter::none();
        };
        if current.coincides(&target, policy.epsilon) {
            return Epicenter::none();
        }

        state.set_position(self.vertex, target);
        let mut epicenter = Epicenter::from_iter(state.neighbors(self.vertex));
        epicenter.insert(self.vertex);
        epicenter
    }
}

/// Translate a selection rigidly and re-route the wires that leave it.
///
/// A wire from the selection to a fixed vertex that is no longer direct gets a
/// corner; its first leg from the fixed side keeps the wire's old direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragVertices {
    pub vertices: BTreeSet<VertexId>,
    /// Translation vector.
    pub offset: Point,
    #[serde(default)]
    pub snap: bool,
}

impl DragVertices {
    pub fn new(vertices: impl IntoIterator<Item = VertexId>, offset: Point) -> Self {
        Self {
            vertices: vertices.into_iter().collect(),
            offset,
            snap: false,
        }
    }
}

impl Transaction for DragVertices {
    fn name(&self) -> &str {
        "drag_vertices"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        let offset = if self.snap { policy.snap(self.offset) } else { self.offset };
        if offset.coincides(&Point::default(), policy.epsilon) {
            return Epicenter::none();
        }

        let selection: Vec<VertexId> = self
            .vertices
            .iter()
            .copied()
            .filter(|v| state.contains_vertex(*v))
            .collect();

        // wires crossing the selection boundary, with their pre-drag direction
        let mut boundary: Vec<(EdgeId, VertexId, VertexId, Option<Orientation>)> = Vec::new();
        for &moving in &selection {
            for edge in state.incident_edges(moving) {
                let Some(fixed) = state.edge(edge).and_then(|e| e.opposite(moving)) else {
                    continue;
                };
                if self.vertices.contains(&fixed) {
                    continue;
                }
                let orientation = match (state.position(moving), state.position(fixed)) {
                    (Some(a), Some(b)) => policy.orientation(&b, &a),
                    _ => None,
                };
                boundary.push((edge, moving, fixed, orientation));
            }
        }

        let mut epicenter = Epicenter::none();
        for &moving in &selection {
            if let Some(p) = state.position(moving) {
                state.set_position(moving, p.offset(offset.x, offset.y));
                epicenter.insert(moving);
            }
        }

        for (edge, moving, fixed, orientation) in boundary {
            epicenter.insert(fixed);
            let (Some(a), Some(b)) = (state.position(fixed), state.position(moving)) else {
                continue;
            };
            if policy.is_direct(&a, &b) || !state.contains_edge(edge) {
                continue;
            }
            state.remove_edge(edge);
            // `last` is the leg we do NOT want first
            let hint = match orientation {
                Some(Orientation::Horizontal) => Some(Orientation::Vertical),
                Some(Orientation::Vertical) => Some(Orientation::Horizontal),
                Some(Orientation::Diagonal) | None => None,
            };
            epicenter.merge(connect_resolved(state, fixed, moving, hint, policy));
        }

        epicenter
    }
}

/// Demote every pin vertex of `owner` back to a free wire joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePinOwnership {
    pub owner: Uuid,
}

impl Transaction for ReleasePinOwnership {
    fn name(&self) -> &str {
        "release_pin_ownership"
    }

    fn apply(&self, state: &mut GraphState, _policy: &GeometryPolicy) -> Epicenter {
        let owned = state.vertices_owned_by(self.owner);
        for &vertex in &owned {
            state.set_ownership(vertex, Ownership::Free);
        }
        owned.into_iter().collect()
    }
}
