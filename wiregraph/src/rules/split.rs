use super::{Rule, Scope};
use crate::geometry::{GeometryPolicy, Rect};
use crate::graph::GraphState;

/// Split any edge that passes over a vertex which is not one of its endpoints,
/// so the vertex becomes a junction on the wire instead of floating over it.
pub struct SplitEdgesAtVertices;

impl Rule for SplitEdgesAtVertices {
    fn name(&self) -> &str {
        "split_edges_at_vertices"
    }

    fn apply(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> bool {
        let mut changed = false;
        for edge_id in scope.edges(state, policy.epsilon) {
            let Some(edge) = state.edge(edge_id).copied() else {
                continue;
            };
            let Some((a, b)) = state.edge_segment(edge_id) else {
                continue;
            };
            let corridor = Rect::of_segment(&a, &b).padded(policy.epsilon);
            let passes_over = state.vertices_in(&corridor).into_iter().any(|v| {
                !edge.touches(v)
                    && state
                        .position(v)
                        .is_some_and(|at| at.lies_inside_segment(&a, &b, policy.epsilon))
            });
            if !passes_over {
                continue;
            }

            // re-lay the run through every vertex on it, in order
            state.remove_edge(edge_id);
            state.connect_straight(edge.start, edge.end, policy.epsilon);
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::graph::Ownership;

    #[test]
    fn test_splits_at_passing_vertex() {
        let policy = GeometryPolicy::default();
        let mut state = GraphState::new();
        let a = state.add_vertex(Point::new(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(Point::new(0.0, 40.0), Ownership::Free, None);
        let m1 = state.add_vertex(Point::new(0.0, 25.0), Ownership::Free, None);
        let m2 = state.add_vertex(Point::new(0.0, 10.0), Ownership::Free, None);
        state.add_edge(a, b);

        assert!(SplitEdgesAtVertices.apply(&mut state, &Scope::Whole, &policy));
        assert!(state.edge_between(a, b).is_none());
        assert!(state.edge_between(a, m2).is_some());
        assert!(state.edge_between(m2, m1).is_some());
        assert!(state.edge_between(m1, b).is_some());
        assert!(!SplitEdgesAtVertices.apply(&mut state, &Scope::Whole, &policy));
    }

    #[test]
    fn test_region_scope_ignores_distant_edges() {
        let policy = GeometryPolicy::default();
        let mut state = GraphState::new();
        let a = state.add_vertex(Point::new(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(Point::new(10.0, 0.0), Ownership::Free, None);
        state.add_vertex(Point::new(5.0, 0.0), Ownership::Free, None);
        state.add_edge(a, b);

        let far = Scope::Region(Rect {
            min: Point::new(100.0, 100.0),
            max: Point::new(110.0, 110.0),
        });
        assert!(!SplitEdgesAtVertices.apply(&mut state, &far, &policy));
        assert!(SplitEdgesAtVertices.apply(&mut state, &Scope::Whole, &policy));
    }
}
