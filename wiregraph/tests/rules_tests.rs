//! Normalization rules driven through the public ruleset and engine

use std::sync::Arc;

use uuid::Uuid;
use wiregraph::prelude::*;
use wiregraph::rules::CullIsolatedPins;
use wiregraph::{GeometryPolicy, Rect, Ruleset, Scope};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Free chain through the given points, no normalization applied.
fn chain(state: &mut GraphState, points: &[(f64, f64)]) -> Vec<VertexId> {
    let ids: Vec<VertexId> = points
        .iter()
        .map(|&(x, y)| state.add_vertex(p(x, y), Ownership::Free, None))
        .collect();
    for pair in ids.windows(2) {
        state.add_edge(pair[0], pair[1]).unwrap();
    }
    ids
}

#[test]
fn test_off_axis_joint_collapses_on_full_normalization() {
    let mut raw = GraphState::new();
    let ids = chain(&mut raw, &[(0.0, 0.0), (50.0, 0.005), (100.0, 0.0)]);

    let mut engine = Engine::default();
    engine.replace_state(raw);
    engine.normalize_all();

    let state = engine.state();
    assert!(!state.contains_vertex(ids[1]));
    assert_eq!(state.vertex_count(), 2);
    assert_eq!(state.edge_count(), 1);
    assert!(state.edge_between(ids[0], ids[2]).is_some());
}

#[test]
fn test_region_resolve_leaves_distant_runs_alone() {
    let policy = GeometryPolicy::default();
    let mut state = GraphState::new();
    let near = chain(&mut state, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    let far = chain(&mut state, &[(500.0, 0.0), (510.0, 0.0), (520.0, 0.0)]);

    let region = Scope::Region(Rect {
        min: p(5.0, -1.0),
        max: p(15.0, 1.0),
    });
    Ruleset::with_default_rules().resolve(&mut state, &region, &policy);

    assert!(!state.contains_vertex(near[1]));
    assert!(state.contains_vertex(far[1]));
    assert_eq!(state.edge_count(), 3);
}

#[test]
fn test_vertex_on_wire_becomes_junction() {
    let mut raw = GraphState::new();
    chain(&mut raw, &[(0.0, 0.0), (40.0, 0.0)]);
    let stub = chain(&mut raw, &[(20.0, 0.0), (20.0, 10.0)]);

    let mut engine = Engine::default();
    engine.replace_state(raw);
    engine.normalize_all();

    let state = engine.state();
    assert_eq!(state.edge_count(), 3);
    assert_eq!(state.degree(stub[0]), 3);
    assert_eq!(state.components().len(), 1);
    let group = state.vertex(stub[0]).unwrap().group;
    assert!(state.vertices().all(|v| v.group == group));
}

#[test]
fn test_isolated_pin_policy_is_pluggable() {
    fn strand_pin(engine: &mut Engine, owner: Uuid) {
        let delta = engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(10.0, 0.0)));
        engine.execute(&GetOrCreatePinVertex::new(p(0.0, 0.0), owner, "1"));
        assert_eq!(engine.state().vertices_owned_by(owner).len(), 1);
        engine.execute(&DeleteItems::edges(delta.created_edges));
    }

    let owner = Uuid::new_v4();
    let mut keeping = Engine::default();
    strand_pin(&mut keeping, owner);
    assert_eq!(keeping.state().vertex_count(), 1);
    assert_eq!(keeping.state().vertices_owned_by(owner).len(), 1);

    let ruleset = Ruleset::with_pin_policy(Arc::new(CullIsolatedPins));
    let mut culling = Engine::with_ruleset(EngineOptions::default(), ruleset);
    strand_pin(&mut culling, owner);
    assert!(culling.state().is_empty());
}

#[test]
fn test_scoped_edits_leave_nothing_for_a_full_pass() {
    let mut engine = Engine::default();
    engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(30.0, 20.0)));
    engine.execute(&ConnectPoints::new(p(15.0, 0.0), p(15.0, -10.0)));
    engine.execute(&ConnectPoints::new(p(30.0, 0.0), p(30.0, 20.0)));
    let joint = engine.state().find_vertex(p(15.0, 0.0), 0.01).unwrap().id;
    engine.execute(&MoveVertex::new(joint, p(15.0, 5.0)));

    assert!(engine.state().check_invariants().is_empty());
    assert!(engine.normalize_all().is_empty());
}
