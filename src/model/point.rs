use super::link::FormatKind;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Point-metadata table keyed by `dataPointId`.
pub type PointTable = AHashMap<String, DataPointMeta>;

/// One live-value source keyed by physical telemetry key.
pub type LiveValues = AHashMap<String, Value>;

/// Declared wire type of a telemetry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Float,
    Double,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Byte,
    SByte,
    String,
    LocalizedText,
    DateTime,
    ByteString,
    Guid,
    StatusCode,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DataType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Byte
                | DataType::SByte
                | DataType::StatusCode
        )
    }

    /// The display kind this type implies when a link carries no explicit format.
    pub fn format_kind(self) -> Option<FormatKind> {
        match self {
            DataType::Boolean => Some(FormatKind::Boolean),
            DataType::DateTime => Some(FormatKind::DateTime),
            DataType::String
            | DataType::LocalizedText
            | DataType::ByteString
            | DataType::Guid => Some(FormatKind::String),
            DataType::Float | DataType::Double => Some(FormatKind::Number),
            DataType::Unknown => None,
            _ if self.is_integer() => Some(FormatKind::Number),
            _ => None,
        }
    }
}

/// Metadata describing where a logical data point lives and how it is typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointMeta {
    pub id: String,
    /// Physical key in the live-value sources.
    pub node_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl DataPointMeta {
    pub fn new(id: impl Into<String>, node_id: impl Into<String>, data_type: DataType) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            node_id: node_id.into(),
            data_type,
            unit: None,
            precision: None,
        }
    }
}
