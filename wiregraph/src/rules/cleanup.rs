use std::sync::Arc;

use super::{Rule, Scope};
use crate::geometry::GeometryPolicy;
use crate::graph::{GraphState, Vertex};

/// Decides whether a pin vertex left with no wires should be deleted.
pub trait IsolatedPinPolicy: Send + Sync {
    fn should_cull(&self, vertex: &Vertex, state: &GraphState) -> bool;
}

/// Pin vertices stay for as long as their owner does.
pub struct KeepIsolatedPins;

impl IsolatedPinPolicy for KeepIsolatedPins {
    fn should_cull(&self, _vertex: &Vertex, _state: &GraphState) -> bool {
        false
    }
}

/// Pin vertices disappear together with their last wire.
pub struct CullIsolatedPins;

impl IsolatedPinPolicy for CullIsolatedPins {
    fn should_cull(&self, _vertex: &Vertex, _state: &GraphState) -> bool {
        true
    }
}

/// Delete free vertices with no incident edges.
pub struct RemoveIsolatedVertices {
    pin_policy: Arc<dyn IsolatedPinPolicy>,
}

impl RemoveIsolatedVertices {
    pub fn new(pin_policy: Arc<dyn IsolatedPinPolicy>) -> Self {
        Self { pin_policy }
    }
}

impl Default for RemoveIsolatedVertices {
    fn default() -> Self {
        Self::new(Arc::new(KeepIsolatedPins))
    }
}

impl Rule for RemoveIsolatedVertices {
    fn name(&self) -> &str {
        "remove_isolated_vertices"
    }

    fn apply(&self, state: &mut GraphState, scope: &Scope, _policy: &GeometryPolicy) -> bool {
        let doomed: Vec<_> = scope
            .vertices(state)
            .into_iter()
            .filter(|&id| state.degree(id) == 0)
            .filter(|&id| {
                state.vertex(id).is_some_and(|v| {
                    v.ownership.is_free() || self.pin_policy.should_cull(v, state)
                })
            })
            .collect();

        for &id in &doomed {
            state.remove_vertex(id);
        }
        !doomed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::graph::Ownership;
    use uuid::Uuid;

    fn sample() -> GraphState {
        let mut state = GraphState::new();
        state.add_vertex(Point::new(0.0, 0.0), Ownership::Free, None);
        state.add_vertex(Point::new(5.0, 0.0), Ownership::pin(Uuid::new_v4(), "1"), None);
        let a = state.add_vertex(Point::new(10.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(Point::new(20.0, 0.0), Ownership::Free, None);
        state.add_edge(a, b);
        state
    }

    #[test]
    fn test_removes_only_isolated_free_vertices() {
        let mut state = sample();
        let rule = RemoveIsolatedVertices::default();

        assert!(rule.apply(&mut state, &Scope::Whole, &GeometryPolicy::default()));
        assert_eq!(state.vertex_count(), 3);
        assert!(state.vertices().any(|v| v.ownership.is_pin()));
        assert!(!rule.apply(&mut state, &Scope::Whole, &GeometryPolicy::default()));
    }

    #[test]
    fn test_cull_policy_removes_isolated_pins() {
        let mut state = sample();
        let rule = RemoveIsolatedVertices::new(Arc::new(CullIsolatedPins));

        rule.apply(&mut state, &Scope::Whole, &GeometryPolicy::default());
        assert_eq!(state.vertex_count(), 2);
    }
}
