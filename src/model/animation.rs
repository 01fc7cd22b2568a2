use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge animation mode. Unrecognized names are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationType {
    None,
    DynamicPowerFlow,
    ConstantUnidirectional,
    Other(String),
}

impl AnimationType {
    pub fn as_str(&self) -> &str {
        match self {
            AnimationType::None => "none",
            AnimationType::DynamicPowerFlow => "dynamic_power_flow",
            AnimationType::ConstantUnidirectional => "constant_unidirectional",
            AnimationType::Other(name) => name,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AnimationType::None)
    }
}

impl From<String> for AnimationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "none" => AnimationType::None,
            "dynamic_power_flow" => AnimationType::DynamicPowerFlow,
            "constant_unidirectional" => AnimationType::ConstantUnidirectional,
            _ => AnimationType::Other(value),
        }
    }
}

impl From<&str> for AnimationType {
    fn from(value: &str) -> Self {
        AnimationType::from(value.to_string())
    }
}

impl From<AnimationType> for String {
    fn from(value: AnimationType) -> Self {
        match value {
            AnimationType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constant-flow speed: a named preset (`slow`, `medium`, `fast`) or seconds per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowSpeed {
    Seconds(f64),
    Preset(String),
}

/// Per-edge animation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_type: Option<AnimationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_data_point_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_data_point_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_net_flow_data_point_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert_flow_direction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_flow_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_flow_speed: Option<FlowSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_flow_activation_data_point_id: Option<String>,
}

impl AnimationSettings {
    pub fn of_type(animation_type: impl Into<AnimationType>) -> Self {
        Self {
            animation_type: Some(animation_type.into()),
            ..Self::default()
        }
    }

    /// True when no type is set or the type is `none`.
    pub fn is_inert(&self) -> bool {
        self.animation_type
            .as_ref()
            .is_none_or(AnimationType::is_none)
    }
}

/// Diagram-wide animation configuration stored in the layout's `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAnimationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(flatten)]
    pub settings: AnimationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globally_invert_default_flow_for_all_edges: Option<bool>,
}

impl GlobalAnimationSettings {
    pub fn enabled(settings: AnimationSettings) -> Self {
        Self {
            is_enabled: Some(true),
            settings,
            globally_invert_default_flow_for_all_edges: None,
        }
    }
}
