//! Transactions
//!
//! A transaction is one named unit of editing intent. It mutates a private
//! working copy of the graph and reports the vertices it touched (the
//! epicenter); restoring global invariants afterwards is left to the ruleset.
//!
//! Transactions are best-effort: references to ids that no longer exist are
//! skipped, which simply yields a smaller epicenter.

pub mod connect;
pub mod edit;
pub mod load;
pub mod vertex;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryPolicy;
use crate::graph::{GraphState, VertexId};

pub use connect::{ConnectPoints, ConnectVertices};
pub use edit::{DeleteItems, DragVertices, MoveVertex, ReleasePinOwnership};
pub use load::{LoadState, SetGroupName};
pub use vertex::{get_or_create_pin_vertex, get_or_create_vertex, GetOrCreatePinVertex, GetOrCreateVertex};

/// Vertices touched by a transaction, used to scope normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Epicenter {
    pub vertices: BTreeSet<VertexId>,
    /// Normalize the entire graph regardless of `vertices`.
    pub whole_graph: bool,
}

impl Epicenter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn whole() -> Self {
        Self {
            vertices: BTreeSet::new(),
            whole_graph: true,
        }
    }

    pub fn insert(&mut self, vertex: VertexId) {
        self.vertices.insert(vertex);
    }

    pub fn merge(&mut self, other: Epicenter) {
        self.vertices.extend(other.vertices);
        self.whole_graph |= other.whole_graph;
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && !self.whole_graph
    }
}

impl FromIterator<VertexId> for Epicenter {
    fn from_iter<I: IntoIterator<Item = VertexId>>(iter: I) -> Self {
        Self {
            vertices: iter.into_iter().collect(),
            whole_graph: false,
        }
    }
}

pub trait Transaction {
    fn name(&self) -> &str;

    /// Apply to the working copy and return the epicenter.
    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter;

    /// Metadata-only transactions skip the ruleset entirely.
    fn is_metadata_only(&self) -> bool {
        false
    }
}

/// Every transaction kind in serializable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AnyTransaction {
    ConnectPoints(ConnectPoints),
    ConnectVertices(ConnectVertices),
    GetOrCreateVertex(GetOrCreateVertex),
    GetOrCreatePinVertex(GetOrCreatePinVertex),
    DeleteItems(DeleteItems),
    MoveVertex(MoveVertex),
    DragVertices(DragVertices),
    ReleasePinOwnership(ReleasePinOwnership),
    LoadState(LoadState),
    SetGroupName(SetGroupName),
}

impl AnyTransaction {
    fn inner(&self) -> &dyn Transaction {
        match self {
            AnyTransaction::ConnectPoints(t) => t,
            AnyTransaction::ConnectVertices(t) => t,
            AnyTransaction::GetOrCreateVertex(t) => t,
            AnyTransaction::GetOrCreatePinVertex(t) => t,
            AnyTransaction::DeleteItems(t) => t,
            AnyTransaction::MoveVertex(t) => t,
            AnyTransaction::DragVertices(t) => t,
            AnyTransaction::ReleasePinOwnership(t) => t,
            AnyTransaction::LoadState(t) => t,
            AnyTransaction::SetGroupName(t) => t,
        }
    }
}

impl Transaction for AnyTransaction {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn apply(&self, state: &mut GraphState, policy: &GeometryPolicy) -> Epicenter {
        self.inner().apply(state, policy)
    }

    fn is_metadata_only(&self) -> bool {
        self.inner().is_metadata_only()
    }
}

macro_rules! impl_from_transaction {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for AnyTransaction {
                fn from(t: $variant) -> Self {
                    AnyTransaction::$variant(t)
                }
            }
        )*
    };
}

impl_from_transaction!(
    ConnectPoints,
    ConnectVertices,
    GetOrCreateVertex,
    GetOrCreatePinVertex,
    DeleteItems,
    MoveVertex,
    DragVertices,
    ReleasePinOwnership,
    LoadState,
    SetGroupName,
);
