//! Session configuration, loadable from TOML.
//!
//! ```toml
//! edit_mode = true
//! auto_save = true
//! debounce_ms = 3000
//!
//! [format]
//! group_separator = ","
//! decimal_separator = "."
//! default_fraction_digits = 3
//! date_time_pattern = "%Y-%m-%d %H:%M:%S"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Edit mode synthesizes a placeholder instead of waiting on the server.
    pub edit_mode: bool,
    pub auto_save: bool,
    /// Fixed trailing-edge window between the first unsaved edit and the auto-save.
    pub debounce_ms: u64,
    pub format: FormatSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            edit_mode: false,
            auto_save: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            format: FormatSettings::default(),
        }
    }
}

impl SessionConfig {
    pub fn editing() -> Self {
        Self {
            edit_mode: true,
            ..Self::default()
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

/// Locale conventions used by the value formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    pub group_separator: String,
    pub decimal_separator: String,
    /// Maximum fraction digits when neither the link nor the point sets a precision.
    pub default_fraction_digits: u32,
    /// strftime pattern used for `dateTime` values without their own pattern.
    pub date_time_pattern: String,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            group_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            default_fraction_digits: 3,
            date_time_pattern: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}
