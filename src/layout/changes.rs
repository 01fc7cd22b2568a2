use super::dirty::ChangeKind;
use crate::model::{Edge, LayoutDocument, Node, Position};

/// A renderer-reported node mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Add(Node),
    Remove { id: String },
    Position { id: String, position: Position },
    Select { id: String, selected: bool },
    Dimensions { id: String, width: f64, height: f64 },
    Replace(Node),
}

impl NodeChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            NodeChange::Add(_) => ChangeKind::Add,
            NodeChange::Remove { .. } => ChangeKind::Remove,
            NodeChange::Position { .. } => ChangeKind::Position,
            NodeChange::Select { .. } => ChangeKind::Select,
            NodeChange::Dimensions { .. } => ChangeKind::Dimensions,
            NodeChange::Replace(_) => ChangeKind::Replace,
        }
    }
}

/// A renderer-reported edge mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Add(Edge),
    Remove { id: String },
    Select { id: String, selected: bool },
    Replace(Edge),
}

impl EdgeChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            EdgeChange::Add(_) => ChangeKind::Add,
            EdgeChange::Remove { .. } => ChangeKind::Remove,
            EdgeChange::Select { .. } => ChangeKind::Select,
            EdgeChange::Replace(_) => ChangeKind::Replace,
        }
    }
}

/// Applies node changes in order. Changes naming an unknown id are ignored,
/// and an added node replaces any existing node with the same id.
pub fn apply_node_changes(doc: &mut LayoutDocument, changes: &[NodeChange]) {
    for change in changes {
        match change {
            NodeChange::Add(node) | NodeChange::Replace(node) => {
                match doc.node_mut(&node.id) {
                    Some(existing) => *existing = node.clone(),
                    None => doc.nodes.push(node.clone()),
                }
            }
            NodeChange::Remove { id } => doc.nodes.retain(|n| &n.id != id),
            NodeChange::Position { id, position } => {
                if let Some(node) = doc.node_mut(id) {
                    node.position = *position;
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = doc.node_mut(id) {
                    node.selected = *selected;
                }
            }
            NodeChange::Dimensions { id, width, height } => {
                if let Some(node) = doc.node_mut(id) {
                    node.width = Some(*width);
                    node.height = Some(*height);
                }
            }
        }
    }
}

pub fn apply_edge_changes(doc: &mut LayoutDocument, changes: &[EdgeChange]) {
    for change in changes {
        match change {
            EdgeChange::Add(edge) | EdgeChange::Replace(edge) => match doc.edge_mut(&edge.id) {
                Some(existing) => *existing = edge.clone(),
                None => doc.edges.push(edge.clone()),
            },
            EdgeChange::Remove { id } => doc.edges.retain(|e| &e.id != id),
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = doc.edge_mut(id) {
                    edge.selected = *selected;
                }
            }
        }
    }
}
