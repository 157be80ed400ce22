//! Delta consumers
//!
//! Anything that mirrors the graph (a scene graph, a per-edge side table)
//! follows it through the deltas the engine publishes instead of rebuilding
//! on every change.

pub mod router;
pub mod scene;
pub mod traces;

use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::{Engine, SubscriptionId};
use crate::graph::{GraphDelta, GraphState};

pub use router::TraceRouter;
pub use scene::{SceneMirror, SceneNode};
pub use traces::{TraceStore, TraceStyle};

pub trait DeltaConsumer {
    fn apply_delta(&mut self, delta: &GraphDelta, state: &Arc<GraphState>);
}

/// Subscribe a shared consumer to every commit of `engine`.
pub fn attach<C>(engine: &mut Engine, consumer: Arc<Mutex<C>>) -> SubscriptionId
where
    C: DeltaConsumer + Send + 'static,
{
    engine.subscribe(move |delta, state| {
        let mut consumer = consumer.lock().unwrap_or_else(PoisonError::into_inner);
        consumer.apply_delta(delta, state);
    })
}
