use std::collections::VecDeque;

use super::{Rule, Scope};
use crate::geometry::GeometryPolicy;
use crate::graph::{GraphState, VertexId};

/// Remove free two-way joints on straight runs, merging their two edges into
/// one. The lower edge id survives and is stretched over the joint.
pub struct CollapseLinearRuns;

impl Rule for CollapseLinearRuns {
    fn name(&self) -> &str {
        "collapse_linear_runs"
    }

    fn apply(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> bool {
        let mut queue: VecDeque<VertexId> = scope.vertices(state).into();
        let mut changed = false;

        while let Some(vertex) = queue.pop_front() {
            if let Some((left, right)) = collapse_joint(state, vertex, policy) {
                changed = true;
                // a neighbor outside the scope may now be collapsible too
                queue.push_back(left);
                queue.push_back(right);
            }
        }
        changed
    }
}

fn collapse_joint(
    state: &mut GraphState,
    vertex: VertexId,
    policy: &GeometryPolicy,
) -> Option<(VertexId, VertexId)> {
    let joint = state.vertex(vertex)?;
    if !joint.ownership.is_free() || state.degree(vertex) != 2 {
        return None;
    }
    let pivot = joint.position;

    let edges: Vec<_> = state.incident_edges(vertex).collect();
    let (keep, drop) = (edges[0], edges[1]);
    let left = state.edge(keep)?.opposite(vertex)?;
    let right = state.edge(drop)?.opposite(vertex)?;
    let (a, b) = (state.position(left)?, state.position(right)?);
    if !policy.is_straight_through(&a, &pivot, &b) {
        return None;
    }

    state.remove_edge(drop);
    if !state.rewire_edge(keep, vertex, right) {
        // left and right are already joined directly
        state.remove_edge(keep);
    }
    state.remove_vertex(vertex);
    Some((left, right))
}
