use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token inside a `defaultValue` that is replaced by the stringified raw value.
pub const PASSTHROUGH_TOKEN: &str = "{passthrough_value}";

/// Declares that a node or edge property is driven by a named telemetry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointLink {
    pub data_point_id: String,
    pub target_property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_mapping: Option<ValueMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatDescriptor>,
}

impl DataPointLink {
    pub fn new(data_point_id: impl Into<String>, target_property: impl Into<String>) -> Self {
        Self {
            data_point_id: data_point_id.into(),
            target_property: target_property.into(),
            value_mapping: None,
            format: None,
        }
    }

    pub fn with_mapping(mut self, mapping: ValueMapping) -> Self {
        self.value_mapping = Some(mapping);
        self
    }

    pub fn with_format(mut self, format: FormatDescriptor) -> Self {
        self.format = Some(format);
        self
    }
}

/// How the rules of a `ValueMapping` are matched against a raw value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    #[default]
    Exact,
    Boolean,
    Range,
    Threshold,
    /// Anything else: no rule can match, only the fallback path applies.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMapping {
    #[serde(rename = "type", default)]
    pub kind: MappingKind,
    #[serde(default)]
    pub mapping: Vec<MappingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl ValueMapping {
    pub fn new(kind: MappingKind, mapping: Vec<MappingRule>) -> Self {
        Self {
            kind,
            mapping,
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<Value>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// One mapping rule. Which fields are consulted depends on the mapping kind.
///
/// Bounds are kept as raw JSON so that malformed documents still load; a
/// non-numeric bound only fails the rule that carries it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Value>,
    #[serde(default)]
    pub value: Value,
}

impl MappingRule {
    pub fn exact(match_value: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            match_value: Some(match_value.into()),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>, value: impl Into<Value>) -> Self {
        Self {
            min: min.map(Value::from),
            max: max.map(Value::from),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn threshold(threshold: f64, value: impl Into<Value>) -> Self {
        Self {
            threshold: Some(Value::from(threshold)),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatKind {
    Number,
    Boolean,
    String,
    DateTime,
}

/// Display formatting attached to a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FormatKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,
}

impl FormatDescriptor {
    pub fn of(kind: FormatKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn number(precision: u32) -> Self {
        Self {
            kind: Some(FormatKind::Number),
            precision: Some(precision),
            ..Self::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}
