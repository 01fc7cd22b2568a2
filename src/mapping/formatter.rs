use super::value::{as_f64, display_string, is_truthy_flag};
use crate::config::FormatSettings;
use crate::model::{DataPointMeta, FormatDescriptor, FormatKind};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt::Write;
use tracing::debug;

/// Display string used for absent values.
pub const MISSING_VALUE: &str = "-";

/// Renders values to display strings.
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    settings: FormatSettings,
}

impl ValueFormatter {
    pub fn new(settings: FormatSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FormatSettings {
        &self.settings
    }

    /// Formats `value` per `descriptor`, falling back on the point's declared type.
    ///
    /// Absent and null values always render as `-`. Anything that cannot be
    /// formatted renders as the plain stringified value.
    pub fn format(
        &self,
        value: Option<&Value>,
        descriptor: Option<&FormatDescriptor>,
        source: Option<&DataPointMeta>,
    ) -> String {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return MISSING_VALUE.to_string();
        };
        let kind = effective_kind(value, descriptor, source);
        let empty = FormatDescriptor::default();
        let descriptor = descriptor.unwrap_or(&empty);

        let formatted = match kind {
            FormatKind::Number => self.format_number(value, descriptor, source),
            FormatKind::Boolean => Some(format_boolean(value, descriptor)),
            FormatKind::DateTime => self.format_date_time(value, descriptor),
            FormatKind::String => Some(affix(display_string(value), descriptor)),
        };
        formatted.unwrap_or_else(|| {
            debug!("value format degraded kind={kind:?} value={value}");
            display_string(value)
        })
    }

    fn format_number(
        &self,
        value: &Value,
        descriptor: &FormatDescriptor,
        source: Option<&DataPointMeta>,
    ) -> Option<String> {
        let n = as_f64(value).filter(|n| n.is_finite())?;
        let precision = descriptor
            .precision
            .or_else(|| source.and_then(|meta| meta.precision))
            .or_else(|| {
                source
                    .filter(|meta| meta.data_type.is_integer())
                    .map(|_| 0)
            });
        let (min_digits, max_digits) = match precision {
            Some(p) => (p, p),
            None => (0, self.settings.default_fraction_digits),
        };
        let grouped = group_number(
            n,
            min_digits as usize,
            max_digits as usize,
            &self.settings,
        );
        Some(affix(grouped, descriptor))
    }

    fn format_date_time(&self, value: &Value, descriptor: &FormatDescriptor) -> Option<String> {
        let Some(parsed) = parse_date_time(value) else {
            return Some(display_string(value));
        };
        let pattern = descriptor
            .date_time_format
            .as_deref()
            .unwrap_or(&self.settings.date_time_pattern);
        let mut out = String::new();
        // chrono reports unknown specifiers as a fmt error instead of panicking here.
        write!(out, "{}", parsed.format(pattern)).ok()?;
        Some(out)
    }
}

fn effective_kind(
    value: &Value,
    descriptor: Option<&FormatDescriptor>,
    source: Option<&DataPointMeta>,
) -> FormatKind {
    descriptor
        .and_then(|d| d.kind)
        .or_else(|| source.and_then(|meta| meta.data_type.format_kind()))
        .unwrap_or(match value {
            Value::Number(_) => FormatKind::Number,
            Value::Bool(_) => FormatKind::Boolean,
            _ => FormatKind::String,
        })
}

fn format_boolean(value: &Value, descriptor: &FormatDescriptor) -> String {
    if is_truthy_flag(value) {
        descriptor.true_label.as_deref().unwrap_or("True").to_string()
    } else {
        descriptor.false_label.as_deref().unwrap_or("False").to_string()
    }
}

fn affix(body: String, descriptor: &FormatDescriptor) -> String {
    let prefix = descriptor.prefix.as_deref().unwrap_or("");
    let suffix = descriptor.suffix.as_deref().unwrap_or("");
    format!("{prefix}{body}{suffix}")
}

/// Rounds to `max_digits`, trims trailing zeros down to `min_digits`, and
/// inserts group separators into the integer part.
fn group_number(n: f64, min_digits: usize, max_digits: usize, settings: &FormatSettings) -> String {
    let rounded = format!("{:.*}", max_digits, n.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded.clone(), String::new()),
    };
    let mut frac = frac_part;
    while frac.len() > min_digits && frac.ends_with('0') {
        frac.pop();
    }

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&settings.group_separator);
        }
        grouped.push(*digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let mut out = String::new();
    if n.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push_str(&settings.decimal_separator);
        out.push_str(&frac);
    }
    out
}

/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[ T]HH:MM:SS` timestamps, plain
/// dates, and epoch milliseconds. Naive values are read as UTC.
fn parse_date_time(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.fixed_offset())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt);
            }
            for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
                    return Some(naive.and_utc().fixed_offset());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().fixed_offset())
        }
        _ => None,
    }
}
