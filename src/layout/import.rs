use crate::error::ValidationError;
use crate::model::LayoutDocument;
use itertools::Itertools;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// A bulk entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLayout {
    pub key: String,
    pub error: ValidationError,
}

/// Result of validating a `layoutId -> document` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkImport {
    pub accepted: BTreeMap<String, LayoutDocument>,
    pub rejected: Vec<RejectedLayout>,
}

impl BulkImport {
    pub fn skipped(&self) -> usize {
        self.rejected.len()
    }
}

/// Structural checks for layout documents arriving from outside the session.
pub struct ImportValidator;

impl ImportValidator {
    pub fn validate(candidate: &Value) -> Result<(), ValidationError> {
        let doc = candidate.as_object().ok_or(ValidationError::NotAnObject)?;
        require(doc, "layoutId", Value::is_string, "string")?;
        let nodes = require(doc, "nodes", Value::is_array, "array")?;
        let edges = require(doc, "edges", Value::is_array, "array")?;

        for (index, node) in as_items(nodes).enumerate() {
            check_node(index, node)?;
        }
        for (index, edge) in as_items(edges).enumerate() {
            check_edge(index, edge)?;
        }
        Ok(())
    }

    /// Validates and decodes a single document.
    pub fn decode(candidate: Value) -> Result<LayoutDocument, ValidationError> {
        Self::validate(&candidate)?;
        serde_json::from_value(candidate).map_err(|err| ValidationError::Decode(err.to_string()))
    }

    pub fn decode_str(text: &str) -> Result<LayoutDocument, ValidationError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| ValidationError::NotJson(err.to_string()))?;
        Self::decode(value)
    }

    /// Validates a bulk file. Only a non-object top level fails outright;
    /// bad entries are collected in `rejected`.
    pub fn validate_bulk(candidate: &Value) -> Result<BulkImport, ValidationError> {
        let entries = candidate.as_object().ok_or(ValidationError::NotAnObject)?;
        Ok(Self::validate_entries(entries))
    }

    pub fn validate_bulk_str(text: &str) -> Result<BulkImport, ValidationError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| ValidationError::NotJson(err.to_string()))?;
        Self::validate_bulk(&value)
    }

    pub fn validate_entries(entries: &Map<String, Value>) -> BulkImport {
        let mut report = BulkImport::default();
        for (key, candidate) in entries {
            match decode_entry(key, candidate) {
                Ok(doc) => {
                    report.accepted.insert(key.clone(), doc);
                }
                Err(error) => report.rejected.push(RejectedLayout {
                    key: key.clone(),
                    error,
                }),
            }
        }
        if !report.rejected.is_empty() {
            warn!(
                "bulk import skipped {} layout(s): {}",
                report.skipped(),
                report
                    .rejected
                    .iter()
                    .map(|r| format!("{} ({})", r.key, r.error))
                    .join(", ")
            );
        }
        report
    }
}

fn decode_entry(key: &str, candidate: &Value) -> Result<LayoutDocument, ValidationError> {
    ImportValidator::validate(candidate)?;
    let layout_id = candidate
        .get("layoutId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if layout_id != key {
        return Err(ValidationError::KeyMismatch {
            key: key.to_string(),
            layout_id: layout_id.to_string(),
        });
    }
    serde_json::from_value(candidate.clone())
        .map_err(|err| ValidationError::Decode(err.to_string()))
}

fn require<'a>(
    doc: &'a Map<String, Value>,
    field: &'static str,
    check: fn(&Value) -> bool,
    expected: &'static str,
) -> Result<&'a Value, ValidationError> {
    doc.get(field)
        .filter(|value| check(value))
        .ok_or(ValidationError::InvalidField { field, expected })
}

fn as_items(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn check_node(index: usize, node: &Value) -> Result<(), ValidationError> {
    let fail = |field, expected| ValidationError::InvalidNode {
        index,
        field,
        expected,
    };
    let node = node.as_object().ok_or(fail("node", "object"))?;
    for (field, check, expected) in [
        ("id", Value::is_string as fn(&Value) -> bool, "string"),
        ("position", Value::is_object, "object"),
        ("data", Value::is_object, "object"),
        ("type", Value::is_string, "string"),
    ] {
        if !node.get(field).is_some_and(check) {
            return Err(fail(field, expected));
        }
    }
    Ok(())
}

fn check_edge(index: usize, edge: &Value) -> Result<(), ValidationError> {
    let fail = |field, expected| ValidationError::InvalidEdge {
        index,
        field,
        expected,
    };
    let edge = edge.as_object().ok_or(fail("edge", "object"))?;
    for field in ["id", "source", "target"] {
        if !edge.get(field).is_some_and(Value::is_string) {
            return Err(fail(field, "string"));
        }
    }
    match edge.get("type") {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(fail("type", "string")),
    }
}
