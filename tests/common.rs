//! Common test utilities for building layouts, telemetry and sessions.
use serde_json::Value;
use sld_engine::prelude::*;
use std::time::{Duration, Instant};

/// Builds a point table where each logical id maps to physical key `plc.<id>`.
#[allow(dead_code)]
pub fn points(ids: &[(&str, DataType)]) -> PointTable {
    ids.iter()
        .map(|(id, dtype)| {
            (
                id.to_string(),
                DataPointMeta::new(*id, physical_key(id), *dtype),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn physical_key(id: &str) -> String {
    format!("plc.{id}")
}

/// Live values keyed by the physical key of each logical id.
#[allow(dead_code)]
pub fn live(values: &[(&str, Value)]) -> LiveValues {
    values
        .iter()
        .map(|(id, value)| (physical_key(id), value.clone()))
        .collect()
}

/// A small feeder: grid -> breaker -> inverter.
#[allow(dead_code)]
pub fn feeder_layout(layout_id: &str) -> LayoutDocument {
    let mut doc = LayoutDocument::new(layout_id);
    doc.meta.name = Some(format!("Feeder {layout_id}"));
    doc.nodes = vec![
        Node::new("grid", "grid", Position { x: 0.0, y: 0.0 }).with_label("Grid"),
        Node::new("breaker", "breaker", Position { x: 0.0, y: 120.0 })
            .with_label("Breaker")
            .with_link(DataPointLink::new("breaker-state", "status")),
        Node::new("inverter", "inverter", Position { x: 0.0, y: 240.0 }).with_label("Inverter"),
    ];
    doc.edges = vec![
        Edge::new("e-grid-breaker", "grid", "breaker").with_flow("AC", "MV"),
        Edge::new("e-breaker-inverter", "breaker", "inverter").with_flow("AC", "LV"),
    ];
    doc
}

#[allow(dead_code)]
pub fn layout_json(doc: &LayoutDocument) -> Value {
    serde_json::to_value(doc).expect("layout should serialize")
}

#[allow(dead_code)]
pub fn node(id: &str) -> Node {
    Node::new(id, "meter", Position { x: 40.0, y: 40.0 }).with_label(id)
}

#[allow(dead_code)]
pub fn editing_session(channel: LoopbackChannel) -> LayoutSession<MemoryStore, LoopbackChannel> {
    LayoutSession::new(SessionConfig::editing(), MemoryStore::new(), channel)
}

#[allow(dead_code)]
pub fn viewing_session(
    store: MemoryStore,
    channel: LoopbackChannel,
) -> LayoutSession<MemoryStore, LoopbackChannel> {
    LayoutSession::new(SessionConfig::default(), store, channel)
}

#[allow(dead_code)]
pub fn after(start: Instant, millis: u64) -> Instant {
    start + Duration::from_millis(millis)
}
