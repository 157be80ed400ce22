//! Graph Engine
//!
//! Owns the canonical [`GraphState`] and runs every edit through the same
//! pipeline: apply the transaction to a working copy, normalize around the
//! epicenter, diff against the previous version, publish, commit.
//!
//! The engine has a single writer. Every mutating method takes `&mut self`,
//! so whoever owns the engine is the only thread that can edit the graph.
//! Subscribers receive an `Arc<GraphState>` snapshot which is immutable and
//! may be handed to other threads freely; reacting off-thread must not touch
//! the engine itself.

use std::sync::Arc;

use crate::core::EngineOptions;
use crate::geometry::{GeometryPolicy, Rect};
use crate::graph::{GraphDelta, GraphState};
use crate::rules::{Ruleset, Scope};
use crate::transactions::{Epicenter, LoadState, Transaction};

pub type SubscriptionId = u64;

type ChangeCallback = Box<dyn FnMut(&GraphDelta, &Arc<GraphState>) + Send>;

/// Result of running the pipeline once, committed or not.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub delta: GraphDelta,
    pub state: GraphState,
    pub epicenter: Epicenter,
    /// Ruleset passes that changed something.
    pub passes: usize,
}

pub struct Engine {
    state: Arc<GraphState>,
    ruleset: Ruleset,
    policy: GeometryPolicy,
    subscribers: Vec<(SubscriptionId, ChangeCallback)>,
    next_subscription: SubscriptionId,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let mut ruleset = Ruleset::with_default_rules();
        ruleset.set_max_passes(options.max_passes);
        Self::with_ruleset(options, ruleset)
    }

    pub fn with_ruleset(options: EngineOptions, ruleset: Ruleset) -> Self {
        Self {
            state: Arc::new(GraphState::new()),
            ruleset,
            policy: options.policy(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn policy(&self) -> &GeometryPolicy {
        &self.policy
    }

    /// The committed state. Clone the `Arc` to keep a snapshot around.
    pub fn state(&self) -> &Arc<GraphState> {
        &self.state
    }

    /// Register a change callback, invoked after every commit with the delta
    /// and the new state.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GraphDelta, &Arc<GraphState>) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Run a transaction through the whole pipeline without committing it or
    /// notifying anyone.
    pub fn preview(&self, transaction: &dyn Transaction) -> Outcome {
        self.preview_from(&self.state, transaction)
    }

    /// Same as [`Engine::preview`] but starting from an arbitrary base state.
    pub fn preview_from(&self, base: &GraphState, transaction: &dyn Transaction) -> Outcome {
        let mut working = base.clone();
        let epicenter = transaction.apply(&mut working, &self.policy);

        let passes = if transaction.is_metadata_only() {
            0
        } else {
            match self.scope_for(&working, &epicenter) {
                Some(scope) => self.ruleset.resolve(&mut working, &scope, &self.policy),
                None => 0,
            }
        };

        let delta = GraphDelta::between(base, &working);
        Outcome {
            delta,
            state: working,
            epicenter,
            passes,
        }
    }

    pub fn execute(&mut self, transaction: &dyn Transaction) -> GraphDelta {
        let outcome = self.preview(transaction);
        tracing::debug!(
            "Executed {} (epicenter {} vertices, {} rule passes): {} changes",
            transaction.name(),
            outcome.epicenter.vertices.len(),
            outcome.passes,
            outcome.delta.len()
        );
        self.commit(outcome.state, outcome.delta)
    }

    /// Install an already-normalized state without running any rules.
    pub fn replace_state(&mut self, state: GraphState) -> GraphDelta {
        let delta = GraphDelta::between(&self.state, &state);
        tracing::debug!("Replaced state: {} changes", delta.len());
        self.commit(state, delta)
    }

    /// Normalize the entire committed graph, e.g. right after loading a document.
    pub fn normalize_all(&mut self) -> GraphDelta {
        let current = GraphState::clone(&self.state);
        self.execute(&LoadState::normalize_all(current))
    }

    fn commit(&mut self, state: GraphState, delta: GraphDelta) -> GraphDelta {
        self.state = Arc::new(state);
        let snapshot = Arc::clone(&self.state);
        for (_, callback) in &mut self.subscribers {
            callback(&delta, &snapshot);
        }
        delta
    }

    /// Neighborhood to normalize: the epicenter's bounding box padded by one
    /// grid step. `None` means there is nothing to normalize.
    fn scope_for(&self, state: &GraphState, epicenter: &Epicenter) -> Option<Scope> {
        if epicenter.whole_graph {
            return Some(Scope::Whole);
        }
        let points: Vec<_> = epicenter
            .vertices
            .iter()
            .filter_map(|v| state.position(*v))
            .collect();
        let rect = Rect::bounding(points.iter())?;
        let pad = self.policy.grid.max(self.policy.epsilon) + self.policy.epsilon;
        Some(Scope::Region(rect.padded(pad)))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
