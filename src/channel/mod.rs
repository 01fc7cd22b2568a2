//! Message contract with the layout server.
//!
//! Messages travel as `{ "type": "<kind>", "payload": { ... } }` JSON objects
//! over a persistent bidirectional connection. Responses are correlated by
//! key, not by request/response pairing.

pub mod loopback;

pub use loopback::LoopbackChannel;

use crate::error::ChannelError;
use crate::model::LayoutDocument;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of server-side layout keys (`sld_<layoutId>`).
pub const SERVER_KEY_PREFIX: &str = "sld_";

pub fn server_key(layout_id: &str) -> String {
    format!("{SERVER_KEY_PREFIX}{layout_id}")
}

pub fn layout_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(SERVER_KEY_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum OutboundMessage {
    GetLayout { key: String },
    SaveSldWidgetLayout { key: String, layout: LayoutDocument },
    DeleteSldLayout { key: String },
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::GetLayout { .. } => "get-layout",
            OutboundMessage::SaveSldWidgetLayout { .. } => "save-sld-widget-layout",
            OutboundMessage::DeleteSldLayout { .. } => "delete-sld-layout",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            OutboundMessage::GetLayout { key }
            | OutboundMessage::SaveSldWidgetLayout { key, .. }
            | OutboundMessage::DeleteSldLayout { key } => key,
        }
    }

    pub fn to_json(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(|err| ChannelError::SendFailed {
            kind: self.kind(),
            message: err.to_string(),
        })
    }
}

/// Messages received from the server. Layout payloads stay as raw JSON so a
/// malformed document is a data error for the session, not a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum InboundMessage {
    LayoutData {
        key: String,
        #[serde(default)]
        layout: Option<Value>,
    },
    LayoutError {
        key: String,
        #[serde(default)]
        error: String,
    },
    LayoutSavedConfirmation {
        key: String,
    },
    LayoutSaveError {
        key: String,
        #[serde(default)]
        error: String,
    },
    /// Unsolicited push of every layout the server holds, keyed by layoutId.
    AllSldLayouts(Map<String, Value>),
}

impl InboundMessage {
    pub fn from_json(text: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(text).map_err(|err| ChannelError::Decode(err.to_string()))
    }

    /// Correlation key, for the key-addressed message kinds.
    pub fn key(&self) -> Option<&str> {
        match self {
            InboundMessage::LayoutData { key, .. }
            | InboundMessage::LayoutError { key, .. }
            | InboundMessage::LayoutSavedConfirmation { key }
            | InboundMessage::LayoutSaveError { key, .. } => Some(key),
            InboundMessage::AllSldLayouts(_) => None,
        }
    }
}

/// Outbound half of the server connection.
pub trait LayoutChannel {
    fn is_connected(&self) -> bool;
    fn send(&mut self, message: OutboundMessage) -> Result<(), ChannelError>;
}
