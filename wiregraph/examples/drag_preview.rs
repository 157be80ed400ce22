//! Example: live drag preview with a scene mirror attached to the engine.
//! Run with: cargo run --example drag_preview [script.json]

use std::path::Path;
use std::sync::{Arc, Mutex};

use wiregraph::prelude::*;
use wiregraph::sync::{attach, SceneMirror};
use wiregraph::load_script;

fn main() -> Result<(), WireGraphError> {
    let mut engine = Engine::default();

    match std::env::args().nth(1) {
        Some(path) => {
            for tx in load_script(Path::new(&path))? {
                engine.execute(&tx);
            }
        }
        None => {
            engine.execute(&ConnectPoints::new(Point::new(0.0, 0.0), Point::new(25.4, 0.0)));
            engine.execute(&ConnectPoints::new(Point::new(12.7, 0.0), Point::new(12.7, 12.7)));
        }
    }

    let scene = Arc::new(Mutex::new(SceneMirror::from_state(engine.state())));
    attach(&mut engine, Arc::clone(&scene));

    let Some(grabbed) = engine.state().vertices().last().map(|v| v.id) else {
        eprintln!("Nothing to drag");
        std::process::exit(1);
    };

    let mut session = DragSession::begin(&engine, [grabbed]).snapped();
    for step in 1..=4 {
        let offset = Point::new(2.0 * step as f64, 1.0 * step as f64);
        let preview = session.update(&engine, offset);
        println!(
            "offset ({:.2}, {:.2}): {} vertices, {} edges, {} changes",
            offset.x,
            offset.y,
            preview.state.vertex_count(),
            preview.state.edge_count(),
            preview.delta.len()
        );
    }

    let delta = session.commit(&mut engine);
    println!("Committed {} changes", delta.len());

    let scene = scene.lock().unwrap_or_else(|e| e.into_inner());
    println!(
        "Scene now holds {} joints and {} wires",
        scene.joint_count(),
        scene.wire_count()
    );
    Ok(())
}
