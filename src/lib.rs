//! # sld-engine - Single-Line Diagram Layout and Telemetry Engine
//!
//! **sld-engine** keeps an electrical single-line diagram consistent across
//! three layout sources (the server, a local store and built-in templates),
//! persists edits through a local-first save path with a debounced auto-save,
//! and turns live telemetry into per-element presentation: colours, text,
//! visibility, standard states and animated power flow along edges.
//!
//! ## Core Workflow
//!
//! 1.  **Configure**: Build a `SessionConfig` in code or load it from TOML.
//! 2.  **Open a layout**: Create a `LayoutSession` over a `LayoutStore` and a
//!     `LayoutChannel`, then `open` a layout id. The session resolves the
//!     document from the highest-precedence source that has it.
//! 3.  **Edit and save**: Feed renderer changes in, call `poll` on every timer
//!     tick to drive auto-save, and route server messages to `handle_message`.
//! 4.  **Present**: Compute a `DiagramPresentation` from the document and a
//!     `TelemetrySnapshot` whenever telemetry changes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sld_engine::prelude::*;
//! use serde_json::json;
//! use std::time::Instant;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::editing();
//!     let deriver = StyleDeriver::new(config.format.clone());
//!     let mut session = LayoutSession::new(config, MemoryStore::new(), LoopbackChannel::connected());
//!
//!     // Nothing is stored yet, so edit mode starts from the placeholder canvas.
//!     session.open("substation_a");
//!
//!     let breaker = Node::new("breaker-1", "breaker", Position { x: 120.0, y: 80.0 })
//!         .with_label("Main Breaker")
//!         .with_link(DataPointLink::new("breaker-closed", "status"));
//!     session.add_node(breaker, Instant::now());
//!     session.save()?;
//!
//!     // Telemetry: point metadata plus one live source keyed by physical id.
//!     let mut points = PointTable::new();
//!     points.insert(
//!         "breaker-closed".to_string(),
//!         DataPointMeta::new("breaker-closed", "ns=2;s=Breaker1.Closed", DataType::Boolean),
//!     );
//!     let mut live = LiveValues::new();
//!     live.insert("ns=2;s=Breaker1.Closed".to_string(), json!("fault"));
//!     let snapshot = TelemetrySnapshot::new(&points).with_source(&live);
//!
//!     if let Some(doc) = session.document() {
//!         let view = DiagramPresentation::compute(doc, &deriver, &snapshot);
//!         if let Some(node) = view.node("breaker-1") {
//!             println!("breaker-1 is {}", node.state);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod channel;
pub mod config;
pub mod error;
pub mod layout;
pub mod mapping;
pub mod model;
pub mod prelude;
pub mod presentation;
