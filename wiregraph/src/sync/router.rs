use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{attach, TraceStore, TraceStyle};
use crate::engine::Engine;
use crate::geometry::Point;
use crate::graph::{EdgeId, GraphDelta, VertexId};
use crate::transactions::{ConnectPoints, DeleteItems};

/// PCB-flavoured front end: an engine plus the trace styles riding on it.
pub struct TraceRouter {
    engine: Engine,
    store: Arc<Mutex<TraceStore>>,
}

impl TraceRouter {
    pub fn new(mut engine: Engine, default_style: TraceStyle) -> Self {
        let store = TraceStore::new(default_style).with_tolerance(engine.policy().epsilon);
        let store = Arc::new(Mutex::new(store));
        attach(&mut engine, Arc::clone(&store));
        Self { engine, store }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Shared handle to the style table, e.g. for a renderer.
    pub fn store(&self) -> Arc<Mutex<TraceStore>> {
        Arc::clone(&self.store)
    }

    /// Route a trace and give every segment along its path `style`. Existing
    /// traces it merely crosses or taps keep their own style.
    pub fn add_trace(&mut self, from: Point, to: Point, style: TraceStyle) -> GraphDelta {
        let delta = self.engine.execute(&ConnectPoints::new(from, to));

        let policy = *self.engine.policy();
        let mut path = vec![from];
        path.extend(policy.decompose_path(from, to, None));
        let tolerance = 2.0 * policy.epsilon;

        let state = Arc::clone(self.engine.state());
        let mut store = self.lock();
        for id in &delta.created_edges {
            let Some((a, b)) = state.edge_segment(*id) else {
                continue;
            };
            let on_path = path.windows(2).any(|leg| {
                a.distance_to_segment(&leg[0], &leg[1]) < tolerance
                    && b.distance_to_segment(&leg[0], &leg[1]) < tolerance
            });
            if on_path {
                store.set_style(*id, style.clone());
            }
        }
        drop(store);

        tracing::info!(
            "Added trace ({}, {}) -> ({}, {}) on {}",
            from.x,
            from.y,
            to.x,
            to.y,
            style.layer
        );
        delta
    }

    pub fn delete(&mut self, vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> GraphDelta {
        let mut tx = DeleteItems::vertices(vertices);
        tx.edges.extend(edges);
        self.engine.execute(&tx)
    }

    pub fn style_of(&self, edge: EdgeId) -> Option<TraceStyle> {
        self.lock().style_of(edge).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, TraceStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
