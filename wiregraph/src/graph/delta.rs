//! Structural diff between two graph snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::schema::*;
use super::state::GraphState;
use crate::geometry::Point;

/// What changed between two [`GraphState`] versions.
///
/// Recomputed after every transaction and handed to subscribers; never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDelta {
    pub created_vertices: BTreeSet<VertexId>,
    pub deleted_vertices: BTreeSet<VertexId>,
    /// Vertex id -> (from, to).
    pub moved_vertices: BTreeMap<VertexId, (Point, Point)>,
    pub created_edges: BTreeSet<EdgeId>,
    pub deleted_edges: BTreeSet<EdgeId>,
    /// Surviving edges whose endpoints changed: id -> (old pair, new pair).
    pub rewired_edges: BTreeMap<EdgeId, ((VertexId, VertexId), (VertexId, VertexId))>,
    pub ownership_changes: BTreeMap<VertexId, (Ownership, Ownership)>,
    pub group_changes: BTreeMap<VertexId, (Option<GroupId>, Option<GroupId>)>,
    pub renamed_groups: BTreeMap<GroupId, (Option<String>, Option<String>)>,
}

impl GraphDelta {
    pub fn between(old: &GraphState, new: &GraphState) -> Self {
        let mut delta = GraphDelta::default();

        for vertex in old.vertices() {
            match new.vertex(vertex.id) {
                None => {
                    delta.deleted_vertices.insert(vertex.id);
                }
                Some(now) => {
                    if now.position != vertex.position {
                        delta
                            .moved_vertices
                            .insert(vertex.id, (vertex.position, now.position));
                    }
                    if now.ownership != vertex.ownership {
                        delta
                            .ownership_changes
                            .insert(vertex.id, (vertex.ownership.clone(), now.ownership.clone()));
                    }
                    if now.group != vertex.group {
                        delta.group_changes.insert(vertex.id, (vertex.group, now.group));
                    }
                }
            }
        }
        for vertex in new.vertices() {
            if !old.contains_vertex(vertex.id) {
                delta.created_vertices.insert(vertex.id);
            }
        }

        for edge in old.edges() {
            match new.edge(edge.id) {
                None => {
                    delta.deleted_edges.insert(edge.id);
                }
                Some(now) if now.key() != edge.key() => {
                    delta.rewired_edges.insert(edge.id, (edge.key(), now.key()));
                }
                Some(_) => {}
            }
        }
        for edge in new.edges() {
            if !old.contains_edge(edge.id) {
                delta.created_edges.insert(edge.id);
            }
        }

        let groups: BTreeSet<GroupId> = old
            .group_names()
            .keys()
            .chain(new.group_names().keys())
            .copied()
            .collect();
        for group in groups {
            let before = old.group_name(group);
            let after = new.group_name(group);
            if before != after {
                delta.renamed_groups.insert(
                    group,
                    (before.map(str::to_string), after.map(str::to_string)),
                );
            }
        }

        delta
    }

    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.deleted_vertices.is_empty()
            && self.moved_vertices.is_empty()
            && self.created_edges.is_empty()
            && self.deleted_edges.is_empty()
            && self.rewired_edges.is_empty()
            && self.ownership_changes.is_empty()
            && self.group_changes.is_empty()
            && self.renamed_groups.is_empty()
    }

    /// Every vertex id mentioned by the delta.
    pub fn touched_vertices(&self) -> BTreeSet<VertexId> {
        self.created_vertices
            .iter()
            .chain(&self.deleted_vertices)
            .chain(self.moved_vertices.keys())
            .chain(self.ownership_changes.keys())
            .chain(self.group_changes.keys())
            .copied()
            .collect()
    }

    /// Number of individual entries, for logging.
    pub fn len(&self) -> usize {
        self.created_vertices.len()
            + self.deleted_vertices.len()
            + self.moved_vertices.len()
            + self.created_edges.len()
            + self.deleted_edges.len()
            + self.rewired_edges.len()
            + self.ownership_changes.len()
            + self.group_changes.len()
            + self.renamed_groups.len()
    }
}
