use serde::{Deserialize, Serialize};

use super::vertex::get_or_create_vertex;
use super::{Epicenter, Transaction};
use crate::geometry::{GeometryPolicy, Orientation, Point};
use crate::graph::{GraphState, VertexId};

/// Draw a wire between two world points, creating or tapping vertices as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectPoints {
    pub from: Point,
    pub to: Point,
    /// Orientation of the previous segment while drawing a multi-segment wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Orientation>,
}

impl ConnectPoints {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to, last: None }
    }

    pub fn after(mut self, last: Orientation) -> Self {
        self.last = Some(last);
        self
    }
}

impl Transaction for ConnectPoints {
    fn name(&self) -> &str {
        "connect_points"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        let start = get_or_create_vertex(state, self.from, policy);
        let end = get_or_create_vertex(state, self.to, policy);
        connect_resolved(state, start, end, self.last, policy)
    }
}

/// Draw a wire between two existing vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectVertices {
    pub from: VertexId,
    pub to: VertexId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Orientation>,
}

impl ConnectVertices {
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to, last: None }
    }
}

impl Transaction for ConnectVertices {
    fn name(&self) -> &str {
        "connect_vertices"
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        connect_resolved(state, self.from, self.to, self.last, policy)
    }
}

/// Join two resolved vertices, straight when the policy allows it, otherwise
/// through one corner.
pub(crate) fn connect_resolved(
    state: &mut GraphState,
    start: VertexId,
    end: VertexId,
    last: Option<Orientation>,
    policy: &GeometryPolicy,
) -> Epicenter {
    let (Some(a), Some(b)) = (state.position(start), state.position(end)) else {
        return Epicenter::none();
    };
    if start == end {
        return Epicenter::from_iter([start]);
    }

    if policy.is_direct(&a, &b) || a.coincides(&b, policy.epsilon) {
        return state.connect_straight(start, end, policy.epsilon).into_iter().collect();
    }

    let path = policy.decompose_path(a, b, last);
    let mut epicenter = Epicenter::from_iter([start, end]);
    let mut previous = start;
    for point in path {
        let next = if point.coincides(&b, policy.epsilon) {
            end
        } else {
            get_or_create_vertex(state, point, policy)
        };
        epicenter
            .vertices
            .extend(state.connect_straight(previous, next, policy.epsilon));
        previous = next;
    }
    epicenter
}
