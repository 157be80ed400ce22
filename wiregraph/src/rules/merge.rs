use super::{Rule, Scope};
use crate::geometry::{GeometryPolicy, Rect};
use crate::graph::{GraphState, Vertex, VertexId};

/// Fold vertices sitting on the same spot into one survivor.
///
/// The survivor is the pin-owned vertex if there is one, otherwise the older
/// vertex. Two pins with different ownership are left alone: each of them
/// has to keep its owner.
pub struct MergeCoincidentVertices;

impl Rule for MergeCoincidentVertices {
    fn name(&self) -> &str {
        "merge_coincident_vertices"
    }

    fn apply(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> bool {
        let mut changed = false;

        for vertex in scope.vertices(state) {
            let Some(position) = state.position(vertex) else {
                continue;
            };
            let around = Rect::of_segment(&position, &position).padded(policy.epsilon);
            let coincident: Vec<VertexId> = state
                .vertices_in(&around)
                .into_iter()
                .filter(|&w| {
                    w != vertex
                        && state
                            .position(w)
                            .is_some_and(|at| at.coincides(&position, policy.epsilon))
                })
                .collect();

            for other in coincident {
                let (Some(a), Some(b)) = (state.vertex(vertex), state.vertex(other)) else {
                    continue;
                };
                let Some((survivor, loser)) = pick_survivor(a, b) else {
                    continue;
                };
                merge_into(state, loser, survivor);
                changed = true;
                if loser == vertex {
                    break;
                }
            }
        }

        changed
    }
}

/// `(survivor, loser)`, or `None` when the pair must not be merged.
fn pick_survivor(a: &Vertex, b: &Vertex) -> Option<(VertexId, VertexId)> {
    match (a.ownership.is_pin(), b.ownership.is_pin()) {
        (true, false) => Some((a.id, b.id)),
        (false, true) => Some((b.id, a.id)),
        (true, true) if a.ownership != b.ownership => None,
        _ if a.id < b.id => Some((a.id, b.id)),
        _ => Some((b.id, a.id)),
    }
}

fn merge_into(state: &mut GraphState, loser: VertexId, survivor: VertexId) {
    let incident: Vec<_> = state.incident_edges(loser).collect();
    for edge in incident {
        // refused rewires are self loops or duplicates: drop them
        if !state.rewire_edge(edge, loser, survivor) {
            state.remove_edge(edge);
        }
    }
    state.remove_vertex(loser);
}
