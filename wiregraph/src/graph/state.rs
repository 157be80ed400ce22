//! Graph State
//!
//! The vertex/edge tables plus the adjacency index derived from them. Every
//! method here is either a read-only query or a low-level structural edit; none
//! of them enforce normalization policy (that is the ruleset's job).

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use petgraph::graphmap::UnGraphMap;
use petgraph::visit::{Bfs, GraphBase, IntoNeighbors, Visitable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::*;
use crate::geometry::{Point, Rect};

/// Side length of the coarse buckets behind spatial lookups.
const CELL_SIZE: f64 = 10.0;

type Cell = (i64, i64);

fn cell_of(point: &Point) -> Cell {
    (
        (point.x / CELL_SIZE).floor() as i64,
        (point.y / CELL_SIZE).floor() as i64,
    )
}

/// Value snapshot of the wire graph.
///
/// Cloning is the versioning mechanism: transactions mutate a private copy and
/// the engine diffs it against the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct GraphState {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    adjacency: BTreeMap<VertexId, BTreeSet<EdgeId>>,
    group_names: BTreeMap<GroupId, String>,
    next_vertex: u64,
    next_edge: u64,
    next_group: u64,
    /// Vertex ids bucketed by position.
    cells: BTreeMap<Cell, BTreeSet<VertexId>>,
    /// Number of vertices carrying each group id.
    group_sizes: BTreeMap<GroupId, usize>,
}

/// Flat serialized form of a [`GraphState`]. The adjacency, bucket and group
/// size indexes are never stored; they are rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub group_names: BTreeMap<GroupId, String>,
    #[serde(default)]
    pub next_vertex: u64,
    #[serde(default)]
    pub next_edge: u64,
    #[serde(default)]
    pub next_group: u64,
}

/// A broken structural invariant found by [`GraphState::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InvariantViolation {
    DanglingEndpoint { edge: EdgeId, vertex: VertexId },
    SelfLoop { edge: EdgeId },
    DuplicateEdge { first: EdgeId, second: EdgeId },
    AdjacencyMismatch { vertex: VertexId, edge: EdgeId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::DanglingEndpoint { edge, vertex } => {
                write!(f, "edge {} references missing vertex {}", edge, vertex)
            }
            InvariantViolation::SelfLoop { edge } => write!(f, "edge {} is a self loop", edge),
            InvariantViolation::DuplicateEdge { first, second } => {
                write!(f, "edges {} and {} connect the same vertices", first, second)
            }
            InvariantViolation::AdjacencyMismatch { vertex, edge } => {
                write!(f, "adjacency of {} disagrees with edge {}", vertex, edge)
            }
        }
    }
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- queries -----------------------------------------------------------

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn position(&self, id: VertexId) -> Option<Point> {
        self.vertices.get(&id).map(|v| v.position)
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn incident_edges(&self, id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn degree(&self, id: VertexId) -> usize {
        self.adjacency.get(&id).map_or(0, |set| set.len())
    }

    /// Vertices one edge away from `id`, ordered by the connecting edge id.
    pub fn neighbors(&self, id: VertexId) -> Vec<VertexId> {
        self.incident_edges(id)
            .filter_map(|e| self.edges.get(&e).and_then(|edge| edge.opposite(id)))
            .collect()
    }

    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.incident_edges(a)
            .find(|e| self.edges.get(e).is_some_and(|edge| edge.opposite(a) == Some(b)))
    }

    pub fn edge_segment(&self, id: EdgeId) -> Option<(Point, Point)> {
        let edge = self.edges.get(&id)?;
        Some((self.position(edge.start)?, self.position(edge.end)?))
    }

    /// Nearest vertex within `tolerance` of `near`. Equal distances resolve to
    /// the older vertex.
    pub fn find_vertex(&self, near: Point, tolerance: f64) -> Option<&Vertex> {
        let around = Rect::of_segment(&near, &near).padded(tolerance);
        let mut best: Option<(&Vertex, f64)> = None;
        for vertex in self.vertices_in(&around).iter().filter_map(|id| self.vertices.get(id)) {
            let d = vertex.position.distance(&near);
            if d < tolerance && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((vertex, d));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Nearest edge whose segment passes within `tolerance` of `near`. Equal
    /// distances resolve to the older edge.
    pub fn find_edge(&self, near: Point, tolerance: f64) -> Option<&Edge> {
        let mut best: Option<(&Edge, f64)> = None;
        for edge in self.edges.values() {
            let Some((a, b)) = self.edge_segment(edge.id) else {
                continue;
            };
            let d = near.distance_to_segment(&a, &b);
            if d < tolerance && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((edge, d));
            }
        }
        best.map(|(e, _)| e)
    }

    /// Vertices inside `rect`, in id order.
    pub fn vertices_in(&self, rect: &Rect) -> Vec<VertexId> {
        let (lo, hi) = (cell_of(&rect.min), cell_of(&rect.max));
        if lo.0 > hi.0 || lo.1 > hi.1 {
            return Vec::new();
        }
        // a huge rect is cheaper to answer with a plain scan
        let columns = hi.0.saturating_sub(lo.0).saturating_add(1);
        if columns as u64 > self.cells.len() as u64 {
            return self
                .vertices
                .values()
                .filter(|v| rect.contains(&v.position))
                .map(|v| v.id)
                .collect();
        }

        let mut found: Vec<VertexId> = Vec::new();
        for column in lo.0..=hi.0 {
            for (_, ids) in self.cells.range((column, lo.1)..=(column, hi.1)) {
                found.extend(ids.iter().copied().filter(|id| {
                    self.vertices.get(id).is_some_and(|v| rect.contains(&v.position))
                }));
            }
        }
        found.sort();
        found
    }

    /// Number of vertices labelled with `group`.
    pub fn group_size(&self, group: GroupId) -> usize {
        self.group_sizes.get(&group).copied().unwrap_or(0)
    }

    pub fn vertices_owned_by(&self, owner: Uuid) -> Vec<VertexId> {
        self.vertices
            .values()
            .filter(|v| v.ownership.owner() == Some(owner))
            .map(|v| v.id)
            .collect()
    }

    pub fn group_name(&self, group: GroupId) -> Option<&str> {
        self.group_names.get(&group).map(String::as_str)
    }

    pub fn group_names(&self) -> &BTreeMap<GroupId, String> {
        &self.group_names
    }

    // --- low-level mutators -----------------------------------------------

    pub fn add_vertex(&mut self, at: Point, ownership: Ownership, group: Option<GroupId>) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(
            id,
            Vertex {
                id,
                position: at,
                ownership,
                group,
            },
        );
        self.adjacency.insert(id, BTreeSet::new());
        self.index_vertex(id, at, group);
        id
    }

    /// Connect two vertices. Returns `None` for a missing endpoint, a self loop,
    /// or a pair that is already connected.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        if from == to || !self.contains_vertex(from) || !self.contains_vertex(to) {
            return None;
        }
        if self.edge_between(from, to).is_some() {
            return None;
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            id,
            Edge {
                id,
                start: from,
                end: to,
            },
        );
        self.adjacency.entry(from).or_default().insert(id);
        self.adjacency.entry(to).or_default().insert(id);
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        for endpoint in [edge.start, edge.end] {
            if let Some(set) = self.adjacency.get_mut(&endpoint) {
                set.remove(&id);
            }
        }
        Some(edge)
    }

    /// Remove a vertex together with every incident edge.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let incident: Vec<EdgeId> = self.incident_edges(id).collect();
        for edge in incident {
            self.remove_edge(edge);
        }
        self.adjacency.remove(&id);
        let vertex = self.vertices.remove(&id)?;
        self.unindex_vertex(id, vertex.position, vertex.group);
        Some(vertex)
    }

    /// Split an edge at `at` with a new free vertex that inherits the start
    /// endpoint's group.
    pub fn split_edge(&mut self, id: EdgeId, at: Point) -> Option<VertexId> {
        let edge = *self.edges.get(&id)?;
        let group = self.vertices.get(&edge.start).and_then(|v| v.group);
        self.remove_edge(id);
        let middle = self.add_vertex(at, Ownership::Free, group);
        self.add_edge(edge.start, middle);
        self.add_edge(middle, edge.end);
        Some(middle)
    }

    /// Split an edge at an existing vertex that is not one of its endpoints.
    pub fn split_edge_at_vertex(&mut self, id: EdgeId, vertex: VertexId) -> bool {
        let Some(edge) = self.edges.get(&id).copied() else {
            return false;
        };
        if edge.touches(vertex) || !self.contains_vertex(vertex) {
            return false;
        }
        self.remove_edge(id);
        self.add_edge(edge.start, vertex);
        self.add_edge(vertex, edge.end);
        true
    }

    /// Move one endpoint of an edge from `from` to `to`, keeping the edge id.
    ///
    /// Refused when it would create a self loop or a parallel duplicate.
    pub fn rewire_edge(&mut self, id: EdgeId, from: VertexId, to: VertexId) -> bool {
        let Some(edge) = self.edges.get(&id).copied() else {
            return false;
        };
        let Some(other) = edge.opposite(from) else {
            return false;
        };
        if other == to || !self.contains_vertex(to) || self.edge_between(other, to).is_some() {
            return false;
        }
        let rewired = if edge.start == from {
            Edge { start: to, ..edge }
        } else {
            Edge { end: to, ..edge }
        };
        self.edges.insert(id, rewired);
        if let Some(set) = self.adjacency.get_mut(&from) {
            set.remove(&id);
        }
        self.adjacency.entry(to).or_default().insert(id);
        true
    }

    pub fn set_position(&mut self, id: VertexId, at: Point) -> bool {
        let Some(v) = self.vertices.get_mut(&id) else {
            return false;
        };
        let before = std::mem::replace(&mut v.position, at);
        let (from, to) = (cell_of(&before), cell_of(&at));
        if from != to {
            self.remove_from_cell(from, id);
            self.cells.entry(to).or_default().insert(id);
        }
        true
    }

    pub fn set_ownership(&mut self, id: VertexId, ownership: Ownership) -> bool {
        match self.vertices.get_mut(&id) {
            Some(v) => {
                v.ownership = ownership;
                true
            }
            None => false,
        }
    }

    pub fn set_group(&mut self, id: VertexId, group: Option<GroupId>) -> bool {
        let Some(v) = self.vertices.get_mut(&id) else {
            return false;
        };
        let before = std::mem::replace(&mut v.group, group);
        if before != group {
            self.count_group(before, false);
            self.count_group(group, true);
        }
        true
    }

    /// Name a group; `None` clears the name.
    pub fn set_group_name(&mut self, group: GroupId, name: Option<String>) {
        match name {
            Some(name) => {
                self.group_names.insert(group, name);
            }
            None => {
                self.group_names.remove(&group);
            }
        }
    }

    pub fn allocate_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Chain-connect two vertices that are already known to be collinear.
    ///
    /// Every other vertex lying on the segment between them is picked up, all
    /// of them are ordered along the segment and consecutive pairs are joined,
    /// so a new run tees into any junction it passes over. Returns the ordered
    /// vertices on the run.
    pub fn connect_straight(&mut self, from: VertexId, to: VertexId, tolerance: f64) -> Vec<VertexId> {
        let (Some(a), Some(b)) = (self.position(from), self.position(to)) else {
            return Vec::new();
        };
        if from == to {
            return vec![from];
        }

        let corridor = Rect::of_segment(&a, &b).padded(tolerance);
        let mut on_run: Vec<(f64, VertexId, Point)> = self
            .vertices_in(&corridor)
            .iter()
            .filter_map(|id| self.vertices.get(id))
            .filter(|v| {
                v.id == from || v.id == to || v.position.distance_to_segment(&a, &b) < tolerance
            })
            .map(|v| (v.position.projection_param(&a, &b), v.id, v.position))
            .collect();
        on_run.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        for pair in on_run.windows(2) {
            let (_, p, p_pos) = pair[0];
            let (_, q, q_pos) = pair[1];
            // coincident vertices are the merge rule's business
            if p_pos.coincides(&q_pos, tolerance) {
                continue;
            }
            self.add_edge(p, q);
        }

        on_run.into_iter().map(|(_, id, _)| id).collect()
    }

    // --- indexes -------------------------------------------------------------

    fn index_vertex(&mut self, id: VertexId, at: Point, group: Option<GroupId>) {
        self.cells.entry(cell_of(&at)).or_default().insert(id);
        self.count_group(group, true);
    }

    fn unindex_vertex(&mut self, id: VertexId, at: Point, group: Option<GroupId>) {
        self.remove_from_cell(cell_of(&at), id);
        self.count_group(group, false);
    }

    fn remove_from_cell(&mut self, cell: Cell, id: VertexId) {
        if let Entry::Occupied(mut entry) = self.cells.entry(cell) {
            entry.get_mut().remove(&id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }

    fn count_group(&mut self, group: Option<GroupId>, added: bool) {
        let Some(group) = group else {
            return;
        };
        match self.group_sizes.entry(group) {
            Entry::Occupied(mut entry) if !added => {
                *entry.get_mut() -= 1;
                if *entry.get() == 0 {
                    entry.remove();
                }
            }
            Entry::Occupied(mut entry) => *entry.get_mut() += 1,
            Entry::Vacant(entry) if added => {
                entry.insert(1);
            }
            Entry::Vacant(_) => {}
        }
    }

    // --- whole-graph views ------------------------------------------------

    /// Topology as a petgraph graph map keyed by vertex id.
    pub fn to_graph(&self) -> UnGraphMap<VertexId, EdgeId> {
        let mut graph = UnGraphMap::with_capacity(self.vertices.len(), self.edges.len());
        for id in self.vertices.keys() {
            graph.add_node(*id);
        }
        for edge in self.edges.values() {
            graph.add_edge(edge.start, edge.end, edge.id);
        }
        graph
    }

    /// Connected components, each sorted by vertex id, ordered by their
    /// smallest vertex.
    pub fn components(&self) -> Vec<Vec<VertexId>> {
        let graph = self.to_graph();
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for &start in self.vertices.keys() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut bfs = Bfs::new(&graph, start);
            while let Some(v) = bfs.next(&graph) {
                seen.insert(v);
                component.push(v);
            }
            component.sort();
            components.push(component);
        }
        components
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut pairs: BTreeMap<(VertexId, VertexId), EdgeId> = BTreeMap::new();

        for edge in self.edges.values() {
            if edge.start == edge.end {
                violations.push(InvariantViolation::SelfLoop { edge: edge.id });
            }
            for endpoint in [edge.start, edge.end] {
                if !self.vertices.contains_key(&endpoint) {
                    violations.push(InvariantViolation::DanglingEndpoint {
                        edge: edge.id,
                        vertex: endpoint,
                    });
                } else if !self.adjacency.get(&endpoint).is_some_and(|s| s.contains(&edge.id)) {
                    violations.push(InvariantViolation::AdjacencyMismatch {
                        vertex: endpoint,
                        edge: edge.id,
                    });
                }
            }
            if let Some(first) = pairs.insert(edge.key(), edge.id) {
                violations.push(InvariantViolation::DuplicateEdge {
                    first,
                    second: edge.id,
                });
            }
        }

        for (vertex, set) in &self.adjacency {
            for edge in set {
                if !self.edges.get(edge).is_some_and(|e| e.touches(*vertex)) {
                    violations.push(InvariantViolation::AdjacencyMismatch {
                        vertex: *vertex,
                        edge: *edge,
                    });
                }
            }
        }

        violations
    }
}

// Lets petgraph traversals walk the adjacency index in place, without
// building a `UnGraphMap` of the whole graph.
impl GraphBase for GraphState {
    type NodeId = VertexId;
    type EdgeId = EdgeId;
}

impl Visitable for GraphState {
    type Map = HashSet<VertexId>;

    fn visit_map(&self) -> Self::Map {
        HashSet::new()
    }

    fn reset_map(&self, map: &mut Self::Map) {
        map.clear();
    }
}

impl<'a> IntoNeighbors for &'a GraphState {
    type Neighbors = std::vec::IntoIter<VertexId>;

    fn neighbors(self, a: VertexId) -> Self::Neighbors {
        GraphState::neighbors(self, a).into_iter()
    }
}

impl From<GraphSnapshot> for GraphState {
    fn from(snapshot: GraphSnapshot) -> Self {
        let mut state = GraphState {
            group_names: snapshot.group_names,
            ..GraphState::default()
        };
        for vertex in snapshot.vertices {
            if let Some(old) = state.vertices.get(&vertex.id).cloned() {
                state.unindex_vertex(old.id, old.position, old.group);
            }
            state.adjacency.insert(vertex.id, BTreeSet::new());
            state.index_vertex(vertex.id, vertex.position, vertex.group);
            state.vertices.insert(vertex.id, vertex);
        }
        for edge in snapshot.edges {
            let valid = edge.start != edge.end
                && state.contains_vertex(edge.start)
                && state.contains_vertex(edge.end)
                && state.edge_between(edge.start, edge.end).is_none()
                && !state.edges.contains_key(&edge.id);
            if !valid {
                tracing::warn!("Dropping invalid edge {} ({} - {}) from snapshot", edge.id, edge.start, edge.end);
                continue;
            }
            state.adjacency.entry(edge.start).or_default().insert(edge.id);
            state.adjacency.entry(edge.end).or_default().insert(edge.id);
            state.edges.insert(edge.id, edge);
        }

        let max_vertex = state.vertices.keys().next_back().map_or(0, |id| id.0 + 1);
        let max_edge = state.edges.keys().next_back().map_or(0, |id| id.0 + 1);
        let max_group = state
            .vertices
            .values()
            .filter_map(|v| v.group)
            .chain(state.group_names.keys().copied())
            .map(|g| g.0 + 1)
            .max()
            .unwrap_or(0);
        state.next_vertex = snapshot.next_vertex.max(max_vertex);
        state.next_edge = snapshot.next_edge.max(max_edge);
        state.next_group = snapshot.next_group.max(max_group);
        state
    }
}

impl From<GraphState> for GraphSnapshot {
    fn from(state: GraphState) -> Self {
        GraphSnapshot {
            vertices: state.vertices.into_values().collect(),
            edges: state.edges.into_values().collect(),
            group_names: state.group_names,
            next_vertex: state.next_vertex,
            next_edge: state.next_edge,
            next_group: state.next_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_add_edge_guards() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);

        assert!(state.add_edge(a, a).is_none());
        assert!(state.add_edge(a, VertexId(99)).is_none());
        assert!(state.add_edge(a, b).is_some());
        assert!(state.add_edge(b, a).is_none(), "parallel duplicate must be refused");
        assert_eq!(state.edge_count(), 1);
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);
        let c = state.add_vertex(p(10.0, 10.0), Ownership::Free, None);
        state.add_edge(a, b);
        state.add_edge(b, c);

        assert!(state.remove_vertex(b).is_some());
        assert_eq!(state.edge_count(), 0);
        assert_eq!(state.degree(a), 0);
        assert_eq!(state.degree(c), 0);
        assert!(state.check_invariants().is_empty());
        assert!(state.remove_vertex(b).is_none());
    }

    #[test]
    fn test_split_edge_inherits_start_group() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, Some(GroupId(7)));
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, Some(GroupId(8)));
        let e = state.add_edge(a, b).unwrap();

        let m = state.split_edge(e, p(4.0, 0.0)).unwrap();
        assert_eq!(state.vertex(m).unwrap().group, Some(GroupId(7)));
        assert!(!state.contains_edge(e));
        assert!(state.edge_between(a, m).is_some());
        assert!(state.edge_between(m, b).is_some());
        assert!(state.split_edge(e, p(5.0, 0.0)).is_none());
    }

    #[test]
    fn test_connect_straight_picks_up_interior_vertices() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let far = state.add_vertex(p(30.0, 0.0), Ownership::Free, None);
        let mid2 = state.add_vertex(p(20.0, 0.0), Ownership::Free, None);
        let mid1 = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);
        let off = state.add_vertex(p(15.0, 5.0), Ownership::Free, None);

        let run = state.connect_straight(a, far, 0.01);
        assert_eq!(run, vec![a, mid1, mid2, far]);
        assert!(state.edge_between(a, mid1).is_some());
        assert!(state.edge_between(mid1, mid2).is_some());
        assert!(state.edge_between(mid2, far).is_some());
        assert!(state.edge_between(a, far).is_none());
        assert_eq!(state.degree(off), 0);
    }

    #[test]
    fn test_rewire_keeps_id() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);
        let c = state.add_vertex(p(20.0, 0.0), Ownership::Free, None);
        let e = state.add_edge(a, b).unwrap();

        assert!(state.rewire_edge(e, b, c));
        assert_eq!(state.edge(e).unwrap().end, c);
        assert_eq!(state.degree(b), 0);
        assert!(!state.rewire_edge(e, c, a), "self loop refused");
        assert!(state.check_invariants().is_empty());
    }

    #[test]
    fn test_find_vertex_prefers_nearest() {
        let mut state = GraphState::new();
        let _a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(0.3, 0.0), Ownership::Free, None);

        let found = state.find_vertex(p(0.25, 0.0), 0.5).unwrap();
        assert_eq!(found.id, b);
        assert!(state.find_vertex(p(5.0, 5.0), 0.5).is_none());
    }

    #[test]
    fn test_components() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);
        let c = state.add_vertex(p(50.0, 0.0), Ownership::Free, None);
        state.add_edge(a, b);

        assert_eq!(state.components(), vec![vec![a, b], vec![c]]);
    }

    #[test]
    fn test_snapshot_rebuilds_adjacency() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, None);
        let b = state.add_vertex(p(10.0, 0.0), Ownership::Free, None);
        state.add_edge(a, b);

        let json = serde_json::to_string(&state).unwrap();
        let restored: GraphState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.degree(a), 1);

        // ids continue past the restored ones
        let mut restored = restored;
        let c = restored.add_vertex(p(1.0, 1.0), Ownership::Free, None);
        assert!(c > b);
    }

    #[test]
    fn test_vertices_in_follows_moves_and_removals() {
        let mut state = GraphState::new();
        let a = state.add_vertex(p(-3.0, 4.0), Ownership::Free, None);
        let b = state.add_vertex(p(25.0, 4.0), Ownership::Free, None);
        let c = state.add_vertex(p(9.99, 10.0), Ownership::Free, None);
        let window = Rect {
            min: p(-5.0, 0.0),
            max: p(12.0, 12.0),
        };
        assert_eq!(state.vertices_in(&window), vec![a, c]);

        state.set_position(b, p(11.0, 1.0));
        state.set_position(a, p(-30.0, 4.0));
        assert_eq!(state.vertices_in(&window), vec![b, c]);

        state.remove_vertex(c);
        assert_eq!(state.vertices_in(&window), vec![b]);
        assert_eq!(state.find_vertex(p(11.004, 1.0), 0.01).map(|v| v.id), Some(b));

        // wider than the occupied buckets
        let everything = Rect {
            min: p(-1e6, -1e6),
            max: p(1e6, 1e6),
        };
        assert_eq!(state.vertices_in(&everything), vec![a, b]);
    }

    #[test]
    fn test_group_sizes_track_labels() {
        let mut state = GraphState::new();
        let g = GroupId(3);
        let a = state.add_vertex(p(0.0, 0.0), Ownership::Free, Some(g));
        let b = state.add_vertex(p(1.0, 0.0), Ownership::Free, None);
        state.set_group(b, Some(g));
        assert_eq!(state.group_size(g), 2);

        state.set_group(a, Some(GroupId(4)));
        state.remove_vertex(b);
        assert_eq!(state.group_size(g), 0);
        assert_eq!(state.group_size(GroupId(4)), 1);

        let restored = GraphState::from(GraphSnapshot::from(state));
        assert_eq!(restored.group_size(GroupId(4)), 1);
        assert_eq!(restored.group_size(g), 0);
    }
}
