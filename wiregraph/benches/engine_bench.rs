use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wiregraph::prelude::*;

/// A ladder of `rungs` horizontal wires tapped into two vertical rails.
fn ladder(rungs: usize) -> Engine {
    let mut engine = Engine::default();
    let height = 5.0 * rungs as f64;
    engine.execute(&ConnectPoints::new(Point::new(0.0, 0.0), Point::new(0.0, height)));
    engine.execute(&ConnectPoints::new(Point::new(50.0, 0.0), Point::new(50.0, height)));
    for i in 1..rungs {
        let y = 5.0 * i as f64;
        engine.execute(&ConnectPoints::new(Point::new(0.0, y), Point::new(50.0, y)));
    }
    engine
}

fn bench_connect(c: &mut Criterion) {
    c.bench_function("build_ladder_50", |b| b.iter(|| ladder(black_box(50))));
}

fn bench_drag_preview(c: &mut Criterion) {
    let engine = ladder(100);
    let grabbed = engine
        .state()
        .find_vertex(Point::new(50.0, 250.0), 0.01)
        .map(|v| v.id)
        .into_iter()
        .collect::<Vec<_>>();

    c.bench_function("drag_preview_update", |b| {
        let mut session = DragSession::begin(&engine, grabbed.clone());
        let mut step = 0.0;
        b.iter(|| {
            step += 0.5;
            session.update(&engine, black_box(Point::new(step % 20.0, 3.0))).passes
        });
    });
}

fn bench_normalize_all(c: &mut Criterion) {
    let engine = ladder(100);
    let state = GraphState::clone(engine.state());

    c.bench_function("normalize_all_ladder_100", |b| {
        b.iter(|| {
            let mut scratch = Engine::default();
            scratch.replace_state(black_box(state.clone()));
            scratch.normalize_all()
        });
    });
}

criterion_group!(benches, bench_connect, bench_drag_preview, bench_normalize_all);
criterion_main!(benches);
