//! WireGraph - geometric connectivity engine for schematic wires and PCB traces
//!
//! Wires are stored as an undirected graph of positioned vertices joined by
//! straight edges. Every edit is a transaction; after each one the engine
//! re-normalizes the neighborhood it touched (merging coincident vertices,
//! splitting edges at passing vertices, collapsing straight runs, dropping
//! orphans, labelling nets) and publishes a structural delta.
//!
//! # Quick Start
//!
//! ```no_run
//! use wiregraph::prelude::*;
//!
//! let mut engine = Engine::new(EngineOptions::default());
//! engine.subscribe(|delta, state| {
//!     println!("{} changes, {} edges now", delta.len(), state.edge_count());
//! });
//!
//! engine.execute(&ConnectPoints::new(Point::new(0.0, 0.0), Point::new(10.0, 5.0)));
//! ```
//!
//! # Features
//!
//! - **Transactions**: connect, get-or-create, delete, move, drag, release pins
//! - **Normalization**: epicenter-scoped, runs to a fixed point
//! - **Deltas**: per-commit diffs for scene graphs and side tables
//! - **Routing policy**: orthogonal or octilinear auto-routed corners

pub mod core;
pub mod drag;
pub mod engine;
pub mod geometry;
pub mod graph;
pub mod rules;
pub mod sync;
pub mod transactions;

// Re-export main types
pub use crate::core::{load_script, load_snapshot, load_state, EngineOptions, WireGraphError};
pub use drag::DragSession;
pub use engine::{Engine, Outcome, SubscriptionId};
pub use geometry::{GeometryPolicy, Orientation, PathStrategy, Point, Rect, Routing};
pub use graph::{
    Edge, EdgeId, GraphDelta, GraphSnapshot, GraphState, GroupId, InvariantViolation, Ownership,
    Vertex, VertexId,
};
pub use rules::{Rule, Ruleset, Scope};
pub use transactions::{AnyTransaction, Epicenter, Transaction};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::transactions::{
        ConnectPoints, ConnectVertices, DeleteItems, DragVertices, GetOrCreatePinVertex,
        GetOrCreateVertex, LoadState, MoveVertex, ReleasePinOwnership, SetGroupName,
    };
    pub use crate::{
        DragSession, Engine, EngineOptions, GraphDelta, GraphState, Ownership, Point,
        Transaction, VertexId, WireGraphError,
    };
}
