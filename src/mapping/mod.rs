//! Telemetry-to-presentation pipeline: resolve, map, format, derive.

pub mod formatter;
pub mod mapper;
pub mod resolver;
pub mod state;
pub mod style;
pub mod value;

pub use formatter::ValueFormatter;
pub use mapper::ValueMapper;
pub use resolver::{TelemetrySnapshot, ValueResolver};
pub use state::{StandardState, StatePalette};
pub use style::{StyleDeriver, StylePatch, Visibility};
