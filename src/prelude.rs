//! Prelude module for convenient imports
//!
//! Re-exports the types needed to run a layout session and derive
//! presentation from telemetry.

// Session and persistence
pub use crate::config::{FormatSettings, SessionConfig};
pub use crate::layout::{
    ChangeKind, DirtyState, EdgeChange, FileStore, LayoutSession, LayoutSource, LayoutStore,
    LoadState, MemoryStore, NodeChange, SaveOutcome, SaveTrigger, SessionEvent, TemplateCatalog,
};

// Server channel
pub use crate::channel::{InboundMessage, LayoutChannel, LoopbackChannel, OutboundMessage};

// Document model
pub use crate::model::{
    AnimationSettings, AnimationType, DataPointLink, DataPointMeta, DataType, Edge,
    FormatDescriptor, FormatKind, GlobalAnimationSettings, LayoutDocument, LiveValues,
    MappingKind, MappingRule, Node, PointTable, Position, ValueMapping, Viewport,
};

// Telemetry mapping and animation
pub use crate::animation::{AnimationSettingsResolver, EdgeFlow, FlowDirection};
pub use crate::mapping::{
    StandardState, StyleDeriver, StylePatch, TelemetrySnapshot, ValueFormatter, ValueMapper,
    Visibility,
};
pub use crate::presentation::DiagramPresentation;

// Error types
pub use crate::error::{
    ChannelError, ConfigError, LayoutError, PersistenceError, StoreError, ValidationError,
};
