use super::formatter::{MISSING_VALUE, ValueFormatter};
use super::mapper::ValueMapper;
use super::resolver::TelemetrySnapshot;
use super::state::StandardState;
use super::value::{as_f64, display_string, is_truthy_flag};
use crate::config::FormatSettings;
use crate::model::DataPointLink;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

/// Visual properties derived from a node's or edge's data-point links.
///
/// Unset fields leave the renderer's own defaults in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub text_color: Option<String>,
    pub visibility: Option<Visibility>,
    pub opacity: Option<f64>,
    /// Any other target property, keyed `--<property>`.
    pub custom: BTreeMap<String, Value>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self == &StylePatch::default()
    }

    pub fn custom_property(&self, property: &str) -> Option<&Value> {
        self.custom.get(&format!("--{property}"))
    }
}

/// Combines resolution, mapping and formatting over a list of links.
#[derive(Debug, Clone, Default)]
pub struct StyleDeriver {
    formatter: ValueFormatter,
}

impl StyleDeriver {
    pub fn new(settings: FormatSettings) -> Self {
        Self {
            formatter: ValueFormatter::new(settings),
        }
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Produces the style patch for `links`. Later links targeting the same
    /// property overwrite earlier ones.
    pub fn derive(&self, links: &[DataPointLink], snapshot: &TelemetrySnapshot<'_>) -> StylePatch {
        let mut patch = StylePatch::default();
        for link in links {
            let Some(mapped) = self.mapped_value(link, snapshot) else {
                continue;
            };
            match link.target_property.as_str() {
                "visible" | "visibility" => patch.visibility = Some(visibility_of(&mapped)),
                "opacity" => {
                    if let Some(opacity) = as_f64(&mapped).filter(|o| !o.is_nan()) {
                        patch.opacity = Some(opacity.clamp(0.0, 1.0));
                    }
                }
                "fillColor" | "backgroundColor" => {
                    patch.background_color = Some(self.formatted(link, mapped, snapshot))
                }
                "strokeColor" | "borderColor" => {
                    patch.border_color = Some(self.formatted(link, mapped, snapshot))
                }
                "textColor" | "color" => {
                    patch.text_color = Some(self.formatted(link, mapped, snapshot))
                }
                other => {
                    let value = self.apply_format(link, mapped, snapshot);
                    patch.custom.insert(format!("--{other}"), value);
                }
            }
        }
        patch
    }

    /// Resolved and mapped value of one link, before any formatting.
    fn mapped_value(&self, link: &DataPointLink, snapshot: &TelemetrySnapshot<'_>) -> Option<Value> {
        let raw = snapshot.value(&link.data_point_id);
        match &link.value_mapping {
            Some(mapping) => ValueMapper::map(raw, mapping),
            None => raw.cloned(),
        }
        .filter(|v| !v.is_null())
    }

    /// Resolves, maps and (for numeric or boolean results with a format) formats
    /// one link. `None` when nothing usable resolved.
    pub fn link_value(&self, link: &DataPointLink, snapshot: &TelemetrySnapshot<'_>) -> Option<Value> {
        let mapped = self.mapped_value(link, snapshot)?;
        Some(self.apply_format(link, mapped, snapshot))
    }

    fn apply_format(&self, link: &DataPointLink, mapped: Value, snapshot: &TelemetrySnapshot<'_>) -> Value {
        match &link.format {
            Some(format) if mapped.is_number() || mapped.is_boolean() => {
                Value::String(self.formatter.format(
                    Some(&mapped),
                    Some(format),
                    snapshot.meta(&link.data_point_id),
                ))
            }
            _ => mapped,
        }
    }

    fn formatted(&self, link: &DataPointLink, mapped: Value, snapshot: &TelemetrySnapshot<'_>) -> String {
        display_string(&self.apply_format(link, mapped, snapshot))
    }

    /// Display text for the link targeting `target_property` (usually `value`).
    ///
    /// `None` when no link targets the property.
    pub fn display_text(
        &self,
        links: &[DataPointLink],
        snapshot: &TelemetrySnapshot<'_>,
        target_property: &str,
    ) -> Option<String> {
        let link = links
            .iter()
            .find(|link| link.target_property == target_property)?;
        let raw = snapshot.value(&link.data_point_id);
        let mapped = match &link.value_mapping {
            Some(mapping) => ValueMapper::map(raw, mapping),
            None => raw.cloned(),
        };

        // A mapping that produced a label such as "ON" is shown verbatim.
        let should_format = link.format.is_some()
            && (mapped.as_ref() == raw
                || mapped
                    .as_ref()
                    .is_some_and(|v| v.is_number() || v.is_boolean()));
        if should_format {
            return Some(self.formatter.format(
                mapped.as_ref(),
                link.format.as_ref(),
                snapshot.meta(&link.data_point_id),
            ));
        }
        Some(match mapped {
            Some(v) if !v.is_null() => display_string(&v),
            _ => MISSING_VALUE.to_string(),
        })
    }

    /// Standard state from the `status` link when it resolves, else `fallback`.
    pub fn status(
        &self,
        links: &[DataPointLink],
        fallback: Option<&str>,
        snapshot: &TelemetrySnapshot<'_>,
    ) -> StandardState {
        let linked = links
            .iter()
            .filter(|link| link.target_property == "status")
            .find_map(|link| self.mapped_value(link, snapshot));
        match (linked, fallback) {
            (Some(value), _) => StandardState::classify(&value),
            (None, Some(status)) => StandardState::classify_str(status),
            (None, None) => StandardState::Unknown,
        }
    }
}

fn visibility_of(value: &Value) -> Visibility {
    let shown = is_truthy_flag(value)
        || value
            .as_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("visible"));
    if shown {
        Visibility::Shown
    } else {
        Visibility::Hidden
    }
}
