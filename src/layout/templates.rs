use crate::model::{
    AnimationSettings, AnimationType, DataPointLink, Edge, FormatDescriptor, GlobalAnimationSettings,
    LayoutDocument, MappingKind, MappingRule, Node, Position, TEXT_LABEL_TYPE, ValueMapping,
};
use serde_json::Value;
use std::collections::BTreeMap;

pub const EMPTY_TEMPLATE_ID: &str = "empty_template";
pub const DEMO_PLANT_ID: &str = "wind_grid_demo";

/// Built-in layouts, the lowest-precedence layout source.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, LayoutDocument>,
}

impl TemplateCatalog {
    /// A catalog without any templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// The blank starter canvas and the demonstration plant.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(empty_template());
        catalog.insert(demo_plant());
        catalog
    }

    pub fn insert(&mut self, doc: LayoutDocument) {
        self.templates.insert(doc.layout_id.clone(), doc);
    }

    pub fn get(&self, layout_id: &str) -> Option<&LayoutDocument> {
        self.templates.get(layout_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutDocument> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn locked(mut node: Node) -> Node {
    node.extra.insert("draggable".to_string(), Value::Bool(false));
    node.extra.insert("selectable".to_string(), Value::Bool(false));
    node
}

fn empty_template() -> LayoutDocument {
    let mut doc = LayoutDocument::new(EMPTY_TEMPLATE_ID);
    doc.meta.description = Some("A blank canvas for starting new SLD designs.".to_string());
    let mut instructions = Node::new(
        "empty_instructions",
        TEXT_LABEL_TYPE,
        Position { x: 300.0, y: 200.0 },
    )
    .with_label("Empty Template");
    instructions.data.extra.insert(
        "text".to_string(),
        Value::String(
            "Empty Layout Template\n\nDrag components from the palette to begin.".to_string(),
        ),
    );
    doc.nodes.push(locked(instructions));
    doc
}

fn breaker_status_link(point: &str) -> DataPointLink {
    DataPointLink::new(point, "status").with_mapping(
        ValueMapping::new(
            MappingKind::Boolean,
            vec![
                MappingRule::value("energized"),
                MappingRule::value("offline"),
            ],
        )
        .with_default("unknown"),
    )
}

fn demo_plant() -> LayoutDocument {
    let mut doc = LayoutDocument::new(DEMO_PLANT_ID);
    doc.meta.name = Some("Wind Plant Demo".to_string());
    doc.meta.description =
        Some("2 MW wind turbine feeding the grid through a shared AC busbar.".to_string());
    doc.meta.global_animation_settings = Some(GlobalAnimationSettings::enabled(
        AnimationSettings {
            grid_net_flow_data_point_id: Some("grid-net-power".to_string()),
            speed_multiplier: Some(5.0),
            ..AnimationSettings::of_type(AnimationType::DynamicPowerFlow)
        },
    ));

    doc.nodes = vec![
        Node::new("wind-turbine-1", "windTurbine", Position { x: 100.0, y: 150.0 })
            .with_label("Wind Turbine")
            .with_link(
                DataPointLink::new("turbine-power", "text")
                    .with_format(FormatDescriptor::number(1).with_suffix(" kW")),
            )
            .with_link(DataPointLink::new("turbine-status", "status")),
        Node::new("wind-inverter-1", "inverter", Position { x: 100.0, y: 300.0 })
            .with_label("Wind Inverter")
            .with_link(DataPointLink::new("inverter-status", "status"))
            .with_link(
                DataPointLink::new("inverter-temperature", "backgroundColor").with_mapping(
                    ValueMapping::new(
                        MappingKind::Threshold,
                        vec![
                            MappingRule::threshold(80.0, "#ef4444"),
                            MappingRule::threshold(60.0, "#f59e0b"),
                        ],
                    ),
                ),
            ),
        Node::new("busbar-wind", "busbar", Position { x: 100.0, y: 450.0 }).with_label("Wind Busbar"),
        Node::new("busbar-ac-1", "busbar", Position { x: 400.0, y: 450.0 }).with_label("Main AC Busbar"),
        Node::new("breaker-grid", "breaker", Position { x: 650.0, y: 450.0 })
            .with_label("Grid Breaker")
            .with_link(breaker_status_link("grid-breaker-closed")),
        Node::new("grid-1", "grid", Position { x: 850.0, y: 450.0 })
            .with_label("Utility Grid")
            .with_link(
                DataPointLink::new("grid-net-power", "text")
                    .with_format(FormatDescriptor::number(2).with_suffix(" MW")),
            ),
    ];

    doc.edges = vec![
        Edge::new("e-wind-turbine-to-inverter", "wind-turbine-1", "wind-inverter-1")
            .with_flow("DC", "LV"),
        Edge::new("e-wind-inverter-to-busbar", "wind-inverter-1", "busbar-wind")
            .with_flow("AC", "LV"),
        Edge::new("e-wind-busbar-to-main-busbar", "busbar-wind", "busbar-ac-1")
            .with_flow("AC", "MV"),
        Edge::new("e-busbar-to-grid-breaker", "busbar-ac-1", "breaker-grid")
            .with_flow("AC", "MV"),
        Edge::new("e-grid-breaker-to-grid", "breaker-grid", "grid-1").with_flow("AC", "MV"),
    ];
    if let Some(edge) = doc.edge_mut("e-wind-busbar-to-main-busbar") {
        edge.source_handle = Some("right".to_string());
        edge.target_handle = Some("left".to_string());
    }
    if let Some(edge) = doc.edge_mut("e-grid-breaker-to-grid") {
        edge.data.data_point_links.push(
            DataPointLink::new("grid-breaker-closed", "isEnergized"),
        );
        edge.data.label = Some("AC".to_string());
    }
    doc
}
