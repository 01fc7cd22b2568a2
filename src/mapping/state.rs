use super::value::display_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse classification of a raw status used to pick a consistent palette
/// across every node and edge renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardState {
    Energized,
    Fault,
    Warning,
    Offline,
    Standby,
    Unknown,
}

/// Colors and icon selected for a `StandardState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePalette {
    pub color: &'static str,
    pub icon: &'static str,
    pub pulse: bool,
}

impl StandardState {
    /// Classifies a raw status value. Booleans read as energized/standby;
    /// strings are matched case-insensitively against the status vocabulary.
    pub fn classify(value: &Value) -> StandardState {
        match value {
            Value::Bool(true) => StandardState::Energized,
            Value::Bool(false) => StandardState::Standby,
            Value::Null => StandardState::Unknown,
            other => Self::classify_str(&display_string(other)),
        }
    }

    pub fn classify_str(status: &str) -> StandardState {
        match status.trim().to_ascii_lowercase().as_str() {
            "fault" | "alarm" | "tripped" | "error" | "failed" => StandardState::Fault,
            "warning" | "warn" | "derating" | "degraded" => StandardState::Warning,
            "offline" | "disconnected" | "unavailable" | "no_comm" | "comm_loss" => {
                StandardState::Offline
            }
            "standby" | "idle" | "open" | "stopped" | "off" | "shutdown" => StandardState::Standby,
            "nominal" | "energized" | "running" | "producing" | "online" | "closed" | "active"
            | "charging" | "discharging" | "connected" | "on" | "grid-tie" => {
                StandardState::Energized
            }
            _ => StandardState::Unknown,
        }
    }

    pub fn palette(self) -> StatePalette {
        match self {
            StandardState::Energized => StatePalette {
                color: "var(--sld-color-energized)",
                icon: "zap",
                pulse: false,
            },
            StandardState::Fault => StatePalette {
                color: "var(--sld-color-fault)",
                icon: "shield-alert",
                pulse: true,
            },
            StandardState::Warning => StatePalette {
                color: "var(--sld-color-warning)",
                icon: "alert-triangle",
                pulse: true,
            },
            StandardState::Offline => StatePalette {
                color: "var(--sld-color-offline)",
                icon: "zap-off",
                pulse: false,
            },
            StandardState::Standby => StatePalette {
                color: "var(--sld-color-standby)",
                icon: "pause-circle",
                pulse: false,
            },
            StandardState::Unknown => StatePalette {
                color: "var(--sld-color-unknown)",
                icon: "help-circle",
                pulse: false,
            },
        }
    }
}

impl fmt::Display for StandardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StandardState::Energized => "energized",
            StandardState::Fault => "fault",
            StandardState::Warning => "warning",
            StandardState::Offline => "offline",
            StandardState::Standby => "standby",
            StandardState::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}
