use std::collections::BTreeMap;
use std::sync::Arc;

use super::DeltaConsumer;
use crate::geometry::Point;
use crate::graph::{EdgeId, GraphDelta, GraphState, GroupId, VertexId};

/// Render-side handle for one graph element. Holds ids and cached geometry
/// only; the graph stays the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Joint {
        vertex: VertexId,
        position: Point,
        is_pin: bool,
        group: Option<GroupId>,
    },
    Wire {
        edge: EdgeId,
        ends: (VertexId, VertexId),
        from: Point,
        to: Point,
    },
}

/// Headless scene graph kept in step with the engine through deltas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMirror {
    joints: BTreeMap<VertexId, SceneNode>,
    wires: BTreeMap<EdgeId, SceneNode>,
    /// Node refreshes performed by `apply_delta`, for diagnostics.
    updates: usize,
}

impl SceneMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: &GraphState) -> Self {
        let mut mirror = Self::new();
        mirror.rebuild(state);
        mirror
    }

    /// Throw everything away and mirror `state` from scratch.
    pub fn rebuild(&mut self, state: &GraphState) {
        self.joints.clear();
        self.wires.clear();
        for vertex in state.vertices() {
            self.refresh_joint(state, vertex.id);
        }
        for edge in state.edges() {
            self.refresh_wire(state, edge.id);
        }
        tracing::debug!(
            "Scene rebuilt: {} joints, {} wires",
            self.joints.len(),
            self.wires.len()
        );
    }

    pub fn joint(&self, id: VertexId) -> Option<&SceneNode> {
        self.joints.get(&id)
    }

    pub fn wire(&self, id: EdgeId) -> Option<&SceneNode> {
        self.wires.get(&id)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    /// True when the mirror holds exactly what a rebuild from `state` would.
    pub fn matches(&self, state: &GraphState) -> bool {
        let fresh = Self::from_state(state);
        self.joints == fresh.joints && self.wires == fresh.wires
    }

    fn refresh_joint(&mut self, state: &GraphState, id: VertexId) {
        if let Some(vertex) = state.vertex(id) {
            self.joints.insert(
                id,
                SceneNode::Joint {
                    vertex: id,
                    position: vertex.position,
                    is_pin: vertex.ownership.is_pin(),
                    group: vertex.group,
                },
            );
        }
    }

    fn refresh_wire(&mut self, state: &GraphState, id: EdgeId) {
        let (Some(edge), Some((from, to))) = (state.edge(id), state.edge_segment(id)) else {
            return;
        };
        self.wires.insert(
            id,
            SceneNode::Wire {
                edge: id,
                ends: (edge.start, edge.end),
                from,
                to,
            },
        );
    }
}

impl DeltaConsumer for SceneMirror {
    fn apply_delta(&mut self, delta: &GraphDelta, state: &Arc<GraphState>) {
        for id in &delta.deleted_edges {
            self.wires.remove(id);
        }
        for id in &delta.deleted_vertices {
            self.joints.remove(id);
        }

        let mut joints: Vec<VertexId> = delta.created_vertices.iter().copied().collect();
        joints.extend(delta.moved_vertices.keys());
        joints.extend(delta.ownership_changes.keys());
        joints.extend(delta.group_changes.keys());
        joints.sort();
        joints.dedup();

        let mut wires: Vec<EdgeId> = delta.created_edges.iter().copied().collect();
        wires.extend(delta.rewired_edges.keys());
        // wires hanging off a moved joint carry stale geometry
        for id in delta.moved_vertices.keys() {
            wires.extend(state.incident_edges(*id));
        }
        wires.sort();
        wires.dedup();

        for id in &joints {
            self.refresh_joint(state, *id);
        }
        for id in &wires {
            self.refresh_wire(state, *id);
        }
        self.updates += joints.len() + wires.len();
    }
}
