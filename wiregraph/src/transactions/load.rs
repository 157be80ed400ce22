use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Epicenter, Transaction};
use crate::geometry::GeometryPolicy;
use crate::graph::{GraphState, GroupId, VertexId};

/// Replace the whole graph, e.g. to commit a drag preview computed out of band
/// or to install a freshly loaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadState {
    pub state: GraphState,
    #[serde(default)]
    pub epicenter: BTreeSet<VertexId>,
    #[serde(default)]
    pub whole_graph: bool,
}

impl LoadState {
    /// Normalize only around `epicenter` after loading.
    ///
    /// An empty epicenter, or loading into an empty graph, normalizes the
    /// whole loaded state instead.
    pub fn new(state: GraphState, epicenter: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            state,
            epicenter: epicenter.into_iter().collect(),
            whole_graph: false,
        }
    }

    /// Normalize the entire loaded graph.
    pub fn normalize_all(state: GraphState) -> Self {
        Self {
            state,
            epicenter: BTreeSet::new(),
            whole_graph: true,
        }
    }
}

impl Transaction for LoadState {
    fn name(&self) -> &str {
        "load_state"
    }

    fn apply(&self, state: &mut GraphState, _policy: &GeometryPolicy) -> Epicenter {
        let initial = state.is_empty();
        *state = self.state.clone();
        let mut epicenter: Epicenter = self
            .epicenter
            .iter()
            .copied()
            .filter(|v| state.contains_vertex(*v))
            .collect();
        epicenter.whole_graph = self.whole_graph || initial || epicenter.vertices.is_empty();
        epicenter
    }
}

/// Name (or unname) a net. Touches only the name table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetGroupName {
    pub group: GroupId,
    #[serde(default)]
    pub name: Option<String>,
}

impl SetGroupName {
    pub fn new(group: GroupId, name: impl Into<String>) -> Self {
        Self {
            group,
            name: Some(name.into()),
        }
    }
}

impl Transaction for SetGroupName {
    fn name(&self) -> &str {
        "set_group_name"
    }

    fn apply(&self, state: &mut GraphState, _policy: &GeometryPolicy) -> Epicenter {
        state.set_group_name(self.group, self.name.clone());
        Epicenter::none()
    }

    fn is_metadata_only(&self) -> bool {
        true
    }
}
