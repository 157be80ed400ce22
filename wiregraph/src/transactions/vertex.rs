use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Epicenter, Transaction};
use crate::geometry::{GeometryPolicy, Point};
use crate::graph::{GraphState, Ownership, VertexId};

/// Resolve a point to a vertex: reuse one within tolerance, else tap into an
/// edge passing through the point, else create a free vertex.
pub fn get_or_create_vertex(state: &mut GraphState, at: Point, policy: &GeometryPolicy) -> VertexId {
    if let Some(vertex) = state.find_vertex(at, policy.epsilon) {
        return vertex.id;
    }

    if let Some(edge) = state.find_edge(at, policy.epsilon).copied() {
        // split on the segment itself so the halves stay straight
        let on_segment = state
            .edge_segment(edge.id)
            .map_or(at, |(a, b)| at.closest_on_segment(&a, &b));
        if let Some(id) = state.split_edge(edge.id, on_segment) {
            return id;
        }
    }

    state.add_vertex(at, Ownership::Free, None)
}

/// Same as [`get_or_create_vertex`], then force pin ownership onto the result.
pub fn get_or_create_pin_vertex(
    state: &mut GraphState,
    at: Point,
    ownership: Ownership,
    policy: &GeometryPolicy,
) -> VertexId {
    let id = get_or_create_vertex(state, at, policy);
    state.set_ownership(id, ownership);
    id
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrCreateVertex {
    pub at: Point,
}

impl Transaction for GetOrCreateVertex {
    fn name(&self) -> &str {
        "get_or_create_vertex"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        Epicenter::from_iter([get_or_create_vertex(state, self.at, policy)])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrCreatePinVertex {
    pub at: Point,
    pub owner: Uuid,
    pub pin: String,
}

impl GetOrCreatePinVertex {
    pub fn new(at: Point, owner: Uuid, pin: impl Into<String>) -> Self {
        Self {
            at,
            owner,
            pin: pin.into(),
        }
    }
}

impl Transaction for GetOrCreatePinVertex {
    fn name(&self) -> &str {
        "get_or_create_pin_vertex"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        let ownership = Ownership::pin(self.owner, self.pin.clone());
        Epicenter::from_iter([get_or_create_pin_vertex(state, self.at, ownership, policy)])
    }
}
