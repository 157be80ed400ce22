//! Consumers following the engine through deltas

use std::sync::{Arc, Mutex};

use wiregraph::prelude::*;
use wiregraph::sync::{attach, SceneMirror, TraceRouter, TraceStore, TraceStyle};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn test_attached_scene_tracks_every_commit() {
    let mut engine = Engine::default();
    let scene = Arc::new(Mutex::new(SceneMirror::new()));
    attach(&mut engine, Arc::clone(&scene));

    engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(30.0, 0.0)));
    engine.execute(&ConnectPoints::new(p(10.0, 0.0), p(10.0, 20.0)));
    engine.execute(&ConnectPoints::new(p(20.0, 0.0), p(25.0, 15.0)));
    let joint = engine.state().find_vertex(p(10.0, 0.0), 0.01).unwrap().id;
    engine.execute(&DeleteItems::vertices([joint]));

    let scene = scene.lock().unwrap();
    assert!(scene.matches(engine.state()));
    assert_eq!(scene.wire_count(), engine.state().edge_count());
}

#[test]
fn test_drag_session_commit_reaches_consumers() {
    let mut engine = Engine::default();
    engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(20.0, 0.0)));
    let scene = Arc::new(Mutex::new(SceneMirror::from_state(engine.state())));
    attach(&mut engine, Arc::clone(&scene));
    let end = engine.state().find_vertex(p(20.0, 0.0), 0.01).unwrap().id;

    let mut session = DragSession::begin(&engine, [end]);
    for step in 1..=5 {
        let preview = session.update(&engine, p(0.0, 2.0 * step as f64));
        assert!(preview.state.check_invariants().is_empty());
    }
    assert_eq!(scene.lock().unwrap().updates(), 0);

    let delta = session.commit(&mut engine);

    assert!(delta.moved_vertices.contains_key(&end));
    assert_eq!(engine.state().position(end), Some(p(20.0, 10.0)));
    assert!(scene.lock().unwrap().matches(engine.state()));
}

#[test]
fn test_uncommitted_session_commits_nothing() {
    let mut engine = Engine::default();
    engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(20.0, 0.0)));
    let end = engine.state().find_vertex(p(20.0, 0.0), 0.01).unwrap().id;

    let session = DragSession::begin(&engine, [end]);
    assert!(session.preview().is_none());
    assert!(session.commit(&mut engine).is_empty());
}

#[test]
fn test_trace_styles_follow_merges() {
    let wide = TraceStyle::new(1.5, "In1.Cu");
    let mut router = TraceRouter::new(Engine::default(), TraceStyle::default());

    // tap the middle of a wide trace, then remove the tap again
    router.add_trace(p(0.0, 0.0), p(40.0, 0.0), wide.clone());
    router.add_trace(p(20.0, 0.0), p(20.0, 10.0), TraceStyle::default());
    assert_eq!(router.engine().state().edge_count(), 3);

    let stub = router
        .engine()
        .state()
        .edges()
        .find(|e| {
            let (a, b) = router.engine().state().edge_segment(e.id).unwrap();
            a.x == b.x
        })
        .unwrap()
        .id;
    router.delete(Vec::new(), vec![stub]);

    // the two halves collapse back into one edge id that kept its style
    let state = Arc::clone(router.engine().state());
    assert_eq!(state.edge_count(), 1);
    let survivor = state.edges().next().unwrap().id;
    assert_eq!(router.style_of(survivor), Some(wide));
}

#[test]
fn test_store_defaults_unrelated_edges() {
    let mut engine = Engine::default();
    let store = Arc::new(Mutex::new(TraceStore::new(TraceStyle::new(0.3, "B.Cu"))));
    attach(&mut engine, Arc::clone(&store));

    let delta = engine.execute(&ConnectPoints::new(p(0.0, 0.0), p(10.0, 10.0)));

    let store = store.lock().unwrap();
    assert_eq!(store.len(), 2);
    for edge in &delta.created_edges {
        assert_eq!(store.style_of(*edge), Some(store.default_style()));
    }
}
