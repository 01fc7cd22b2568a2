use super::animation::{AnimationSettings, GlobalAnimationSettings};
use super::is_false;
use super::link::DataPointLink;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Reserved id of the empty-canvas marker node. It is never persisted.
pub const PLACEHOLDER_NODE_ID: &str = "sld-placeholder-node";

/// Node type used for the placeholder and for free text annotations.
pub const TEXT_LABEL_TYPE: &str = "textLabel";

/// The full serializable description of one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub layout_id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub meta: LayoutMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Descriptive metadata carried alongside the geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_animation_settings: Option<GlobalAnimationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutMeta {
    /// Fills every field that is unset here from `stored`. Fields already present win.
    pub fn merge_missing_from(&mut self, stored: &LayoutMeta) {
        fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(other);
            }
        }
        fill(&mut self.name, &stored.name);
        fill(&mut self.description, &stored.description);
        fill(
            &mut self.global_animation_settings,
            &stored.global_animation_settings,
        );
        fill(&mut self.last_modified, &stored.last_modified);
        fill(&mut self.version, &stored.version);
        fill(&mut self.author, &stored.author);
        for (key, value) in &stored.extra {
            self.extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A typed element on the canvas (breaker, inverter, meter, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Renderer-specific fields (`draggable`, `zIndex`, ...) kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, position: Position) -> Self {
        let kind = kind.into();
        Self {
            id: id.into(),
            data: NodeData {
                label: String::new(),
                element_type: kind.clone(),
                ..NodeData::default()
            },
            kind,
            position,
            selected: false,
            width: None,
            height: None,
            extra: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = label.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.data.status = Some(status.into());
        self
    }

    pub fn with_link(mut self, link: DataPointLink) -> Self {
        self.data.data_point_links.push(link);
        self
    }

    /// The empty-canvas marker shown while a diagram has no real content.
    pub fn placeholder(layout_id: &str) -> Self {
        let mut node = Node::new(
            PLACEHOLDER_NODE_ID,
            TEXT_LABEL_TYPE,
            Position { x: 200.0, y: 100.0 },
        )
        .with_label(format!(
            "Layout: {}\n\nDrag elements from the palette to build your diagram.",
            layout_id.replace('_', " ")
        ));
        node.extra.insert("draggable".to_string(), Value::Bool(false));
        node.extra.insert("selectable".to_string(), Value::Bool(false));
        node.extra.insert("zIndex".to_string(), Value::from(-1000));
        node
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_NODE_ID
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_point_links: Vec<DataPointLink>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A power or control connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub data: EdgeData,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: Some("animatedFlow".to_string()),
            source_handle: None,
            target_handle: None,
            data: EdgeData::default(),
            selected: false,
            extra: Map::new(),
        }
    }

    pub fn with_flow(mut self, flow_type: &str, voltage_level: &str) -> Self {
        self.data.flow_type = Some(flow_type.to_string());
        self.data.voltage_level = Some(voltage_level.to_string());
        self
    }

    pub fn with_animation(mut self, settings: AnimationSettings) -> Self {
        self.data.animation_settings = Some(settings);
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_settings: Option<AnimationSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_point_links: Vec<DataPointLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_energized: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutDocument {
    /// An empty document with a unit viewport.
    pub fn new(layout_id: impl Into<String>) -> Self {
        Self {
            layout_id: layout_id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Some(Viewport::default()),
            meta: LayoutMeta::default(),
        }
    }

    /// A document holding only the placeholder node.
    pub fn placeholder(layout_id: &str) -> Self {
        let mut doc = Self::new(layout_id);
        doc.nodes.push(Node::placeholder(layout_id));
        doc
    }

    pub fn has_placeholder(&self) -> bool {
        self.nodes.iter().any(Node::is_placeholder)
    }

    /// True when the document holds at least one non-placeholder node or any edge.
    pub fn has_real_content(&self) -> bool {
        !self.edges.is_empty() || self.nodes.iter().any(|n| !n.is_placeholder())
    }

    /// Drops the placeholder once real content exists. Returns whether it was removed.
    pub fn remove_placeholder_if_needed(&mut self) -> bool {
        if self.has_real_content() && self.has_placeholder() {
            self.nodes.retain(|n| !n.is_placeholder());
            return true;
        }
        false
    }

    /// A copy suitable for persistence: the placeholder is never written.
    pub fn without_placeholder(&self) -> LayoutDocument {
        let mut doc = self.clone();
        doc.nodes.retain(|n| !n.is_placeholder());
        doc
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> BTreeSet<&str> {
        self.edges.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn global_animation(&self) -> Option<&GlobalAnimationSettings> {
        self.meta.global_animation_settings.as_ref()
    }
}
