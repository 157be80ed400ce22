//! Normalization Rules
//!
//! After every structural transaction the engine runs the ruleset over the
//! neighborhood of the epicenter until nothing changes. Rules run in a fixed
//! order:
//!
//! 1. merge coincident vertices
//! 2. split edges at vertices lying on them
//! 3. collapse straight runs through free two-way joints
//! 4. remove isolated free vertices
//! 5. label connected components with group ids
//!
//! Every rule is idempotent, so "run until no rule reports a change" is the
//! only termination test needed.

pub mod cleanup;
pub mod collapse;
pub mod groups;
pub mod merge;
pub mod split;

use std::sync::Arc;

use crate::geometry::{GeometryPolicy, Point, Rect};
use crate::graph::{EdgeId, GraphState, VertexId};

pub use cleanup::{CullIsolatedPins, IsolatedPinPolicy, KeepIsolatedPins, RemoveIsolatedVertices};
pub use collapse::CollapseLinearRuns;
pub use groups::AssignGroups;
pub use merge::MergeCoincidentVertices;
pub use split::SplitEdgesAtVertices;

/// Default cap on ruleset passes per transaction.
pub const DEFAULT_MAX_PASSES: usize = 32;

/// Where rules are allowed to look for work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope {
    Whole,
    Region(Rect),
}

impl Scope {
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Scope::Whole => true,
            Scope::Region(rect) => rect.contains(point),
        }
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        match self {
            Scope::Whole => true,
            Scope::Region(region) => region.intersects(rect),
        }
    }

    /// Vertices inside the scope, in id order.
    pub fn vertices(&self, state: &GraphState) -> Vec<VertexId> {
        match self {
            Scope::Whole => state.vertices().map(|v| v.id).collect(),
            Scope::Region(rect) => state.vertices_in(rect),
        }
    }

    /// Edges whose bounding box, padded by `pad`, meets the scope.
    pub fn edges(&self, state: &GraphState, pad: f64) -> Vec<EdgeId> {
        state
            .edges()
            .filter_map(|e| {
                let (a, b) = state.edge_segment(e.id)?;
                self.intersects(&Rect::of_segment(&a, &b).padded(pad))
                    .then_some(e.id)
            })
            .collect()
    }

    /// Vertices inside the scope plus the endpoints of every edge crossing it.
    pub fn reach(&self, state: &GraphState, pad: f64) -> Vec<VertexId> {
        let mut reached = self.vertices(state);
        for id in self.edges(state, pad) {
            if let Some(edge) = state.edge(id) {
                reached.push(edge.start);
                reached.push(edge.end);
            }
        }
        reached.sort();
        reached.dedup();
        reached
    }
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    /// Apply once; returns true if the state changed.
    fn apply(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> bool;
}

pub struct Ruleset {
    rules: Vec<Arc<dyn Rule>>,
    max_passes: usize,
}

impl Ruleset {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_default_rules() -> Self {
        Self::with_pin_policy(Arc::new(KeepIsolatedPins))
    }

    /// Default rules, with a custom decision for isolated pin vertices.
    pub fn with_pin_policy(pin_policy: Arc<dyn IsolatedPinPolicy>) -> Self {
        let mut ruleset = Self::new();
        ruleset.add_rule(Arc::new(MergeCoincidentVertices));
        ruleset.add_rule(Arc::new(SplitEdgesAtVertices));
        ruleset.add_rule(Arc::new(CollapseLinearRuns));
        ruleset.add_rule(Arc::new(RemoveIsolatedVertices::new(pin_policy)));
        ruleset.add_rule(Arc::new(AssignGroups));
        ruleset
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn set_max_passes(&mut self, max_passes: usize) {
        self.max_passes = max_passes.max(1);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Apply every rule in order, repeating until a full pass changes nothing.
    ///
    /// Returns the number of passes that changed the state.
    pub fn resolve(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> usize {
        let mut changed_passes = 0;
        for _ in 0..self.max_passes {
            let mut changed = false;
            for rule in &self.rules {
                if rule.apply(state, scope, policy) {
                    tracing::trace!("Rule {} changed the graph", rule.name());
                    changed = true;
                }
            }
            if !changed {
                return changed_passes;
            }
            changed_passes += 1;
        }
        tracing::warn!(
            "Ruleset did not settle after {} passes; leaving graph as is",
            self.max_passes
        );
        changed_passes
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
