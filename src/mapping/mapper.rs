use super::value::{as_f64, display_string, is_truthy_flag};
use crate::error::MappingError;
use crate::model::{MappingKind, MappingRule, PASSTHROUGH_TOKEN, ValueMapping};
use serde_json::Value;
use tracing::debug;

/// Applies a declarative `ValueMapping` to a raw telemetry value.
pub struct ValueMapper;

impl ValueMapper {
    /// Maps `raw` through `mapping`.
    ///
    /// Rules are tried top to bottom. Without a match the default value is used
    /// (with `{passthrough_value}` substituted), and without a default the raw
    /// value passes through unchanged. A missing or null raw value goes straight
    /// to the default when one exists.
    pub fn map(raw: Option<&Value>, mapping: &ValueMapping) -> Option<Value> {
        let missing = raw.is_none_or(Value::is_null);
        if missing && mapping.default_value.is_some() {
            return Self::fallback(raw, mapping);
        }
        let value = raw?;

        match Self::evaluate(value, mapping) {
            Ok(Some(mapped)) => Some(mapped),
            Ok(None) => Self::fallback(raw, mapping),
            Err(err) => {
                debug!("value mapping degraded kind={:?} error={err}", mapping.kind);
                Self::fallback(raw, mapping)
            }
        }
    }

    fn evaluate(value: &Value, mapping: &ValueMapping) -> Result<Option<Value>, MappingError> {
        let rules = &mapping.mapping;
        match mapping.kind {
            MappingKind::Exact => Ok(exact_match(value, rules)),
            MappingKind::Boolean => match rules.as_slice() {
                [] => Ok(None),
                [_] => Ok(exact_match(value, rules)),
                [on, off, ..] => Ok(Some(if is_truthy_flag(value) {
                    on.value.clone()
                } else {
                    off.value.clone()
                })),
            },
            MappingKind::Range => {
                let Some(n) = as_f64(value) else {
                    return Ok(None);
                };
                for (index, rule) in rules.iter().enumerate() {
                    let min = bound(rule.min.as_ref(), index, "min")?.unwrap_or(f64::NEG_INFINITY);
                    let max = bound(rule.max.as_ref(), index, "max")?.unwrap_or(f64::INFINITY);
                    if min <= n && n < max {
                        return Ok(Some(rule.value.clone()));
                    }
                }
                Ok(None)
            }
            // First satisfied rule wins; rules are expected most-specific first.
            MappingKind::Threshold => {
                let Some(n) = as_f64(value) else {
                    return Ok(None);
                };
                for (index, rule) in rules.iter().enumerate() {
                    let threshold = bound(rule.threshold.as_ref(), index, "threshold")?
                        .ok_or(MappingError::MissingField {
                            index,
                            field: "threshold",
                        })?;
                    if threshold <= n {
                        return Ok(Some(rule.value.clone()));
                    }
                }
                Ok(None)
            }
            MappingKind::Unknown => Ok(None),
        }
    }

    fn fallback(raw: Option<&Value>, mapping: &ValueMapping) -> Option<Value> {
        match &mapping.default_value {
            Some(Value::String(template)) if template.contains(PASSTHROUGH_TOKEN) => {
                let raw_text = raw.map(display_string).unwrap_or_default();
                Some(Value::String(template.replace(PASSTHROUGH_TOKEN, &raw_text)))
            }
            Some(default) => Some(default.clone()),
            None => raw.cloned(),
        }
    }
}

fn exact_match(value: &Value, rules: &[MappingRule]) -> Option<Value> {
    let needle = display_string(value);
    rules
        .iter()
        .find(|rule| {
            rule.match_value
                .as_ref()
                .is_some_and(|m| display_string(m) == needle)
        })
        .map(|rule| rule.value.clone())
}

/// Reads an optional numeric bound. Absent and null bounds are unbounded.
fn bound(
    raw: Option<&Value>,
    index: usize,
    field: &'static str,
) -> Result<Option<f64>, MappingError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_f64(v)
            .map(Some)
            .ok_or_else(|| MappingError::NonNumericBound {
                index,
                field,
                found: v.clone(),
            }),
    }
}
