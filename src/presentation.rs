//! Per-tick presentation of a whole diagram.

use crate::animation::{AnimationSettingsResolver, EdgeFlow, EffectiveAnimation};
use crate::mapping::{StandardState, StyleDeriver, StylePatch, TelemetrySnapshot};
use crate::model::LayoutDocument;
use std::collections::BTreeMap;

/// Target properties whose mapped value becomes a node's display text.
const TEXT_PROPERTIES: [&str; 2] = ["text", "value"];

#[derive(Debug, Clone, PartialEq)]
pub struct NodePresentation {
    pub style: StylePatch,
    pub state: StandardState,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgePresentation {
    pub style: StylePatch,
    pub animation: Option<EffectiveAnimation>,
    pub flow: EdgeFlow,
}

/// Style, state and flow for every element of a document, computed from one
/// telemetry snapshot. Recomputed on every tick; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramPresentation {
    pub nodes: BTreeMap<String, NodePresentation>,
    pub edges: BTreeMap<String, EdgePresentation>,
}

impl DiagramPresentation {
    pub fn compute(
        doc: &LayoutDocument,
        deriver: &StyleDeriver,
        snapshot: &TelemetrySnapshot<'_>,
    ) -> Self {
        let nodes = doc
            .nodes
            .iter()
            .filter(|node| !node.is_placeholder())
            .map(|node| {
                let links = &node.data.data_point_links;
                let presentation = NodePresentation {
                    style: deriver.derive(links, snapshot),
                    state: deriver.status(links, node.data.status.as_deref(), snapshot),
                    text: TEXT_PROPERTIES
                        .iter()
                        .find_map(|property| deriver.display_text(links, snapshot, property)),
                };
                (node.id.clone(), presentation)
            })
            .collect();

        let global = doc.global_animation();
        let edges = doc
            .edges
            .iter()
            .map(|edge| {
                let animation = AnimationSettingsResolver::resolve_edge(global, edge);
                let flow = EdgeFlow::evaluate(edge, animation.as_ref(), deriver, snapshot);
                let presentation = EdgePresentation {
                    style: deriver.derive(&edge.data.data_point_links, snapshot),
                    animation,
                    flow,
                };
                (edge.id.clone(), presentation)
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&NodePresentation> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgePresentation> {
        self.edges.get(id)
    }
}
