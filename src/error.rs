use thiserror::Error;

/// Errors raised while reading a layout document from storage or from the server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Failed to parse layout JSON for '{layout_id}': {message}")]
    JsonParseError { layout_id: String, message: String },

    #[error("Layout stored under '{expected}' carries mismatched layoutId '{found}'")]
    IdMismatch { expected: String, found: String },

    #[error("Layout '{0}' has a non-list 'nodes' field")]
    NodesNotAList(String),

    #[error("Failed to serialize layout '{layout_id}': {message}")]
    SerializeError { layout_id: String, message: String },
}

/// Errors that can occur while evaluating a single value-mapping rule.
///
/// These never leave the mapping pipeline; the mapper logs them and degrades to
/// the default value or the raw value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Rule {index} has a non-numeric '{field}' bound: {found}")]
    NonNumericBound {
        index: usize,
        field: &'static str,
        found: serde_json::Value,
    },

    #[error("Rule {index} is missing its '{field}' field")]
    MissingField { index: usize, field: &'static str },
}

/// Structural problems found when validating an imported layout document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Document is not valid JSON: {0}")]
    NotJson(String),

    #[error("Document must be a JSON object")]
    NotAnObject,

    #[error("Missing or invalid '{field}' (expected {expected})")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Node at index {index} has a missing or invalid '{field}' (expected {expected})")]
    InvalidNode {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Edge at index {index} has a missing or invalid '{field}' (expected {expected})")]
    InvalidEdge {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Bulk entry key '{key}' does not match its layoutId '{layout_id}'")]
    KeyMismatch { key: String, layout_id: String },

    #[error("Document shape is valid but could not be decoded: {0}")]
    Decode(String),
}

/// Errors reported by a `LayoutStore` backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage I/O failed for key '{key}': {message}")]
    Io { key: String, message: String },

    #[error("Storage key '{0}' contains characters the backend cannot represent")]
    InvalidKey(String),
}

/// Errors reported by a `LayoutChannel` transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel is not connected")]
    Disconnected,

    #[error("Failed to send '{kind}' message: {message}")]
    SendFailed { kind: &'static str, message: String },

    #[error("Failed to decode inbound message: {0}")]
    Decode(String),
}

/// Errors raised while loading a `SessionConfig`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Errors raised while committing a layout to the local store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
