#![forbid(unsafe_code)]

//! Global border and resizer settings.
//!
//! [`GlobalSettings`] is loaded once at startup by merging stored values over
//! the defaults, mutated only through the settings surface, and persisted on
//! every mutation. It is passed explicitly into resolution and rendering.
//!
//! # Loading
//!
//! ```json
//! { "showBorders": true, "borderColor": "#f0f0f0", "borderTransparency": 80 }
//! ```
//!
//! Loading is lenient per field: a missing or malformed field takes that
//! field's default and the rest of the document still applies.
//!
//! ```
//! use mcol_style::GlobalSettings;
//!
//! let settings = GlobalSettings::from_json_str(r#"{"borderWidth": "wide", "resizerWidth": 5}"#);
//! assert_eq!(settings.border_width, 1);
//! assert_eq!(settings.resizer_width, 5);
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::{leading_int, to_rgba};
use crate::style::vars;

/// Errors raised while reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// I/O error reading or writing the file.
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The settings could not be encoded.
    #[error("settings JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-wide border and resizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Show the border around every column container.
    pub show_borders: bool,
    /// Border width in pixels.
    pub border_width: u32,
    /// Border color as hex, hsl, or rgb.
    pub border_color: String,
    /// Border opacity, 0–100.
    pub border_transparency: u8,
    /// Show resizers between columns (they still show on hover).
    pub show_resizer: bool,
    /// Resizer color as hex, hsl, or rgb.
    pub resizer_color: String,
    /// Resizer width in pixels.
    pub resizer_width: u32,
    /// Resizer opacity, 0–100.
    pub resizer_transparency: u8,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            show_borders: true,
            border_width: 1,
            border_color: "#f0f0f0".to_string(),
            border_transparency: 100,
            show_resizer: true,
            resizer_color: "#f0f0f0".to_string(),
            resizer_width: 3,
            resizer_transparency: 100,
        }
    }
}

impl GlobalSettings {
    /// Merge a stored JSON document over the defaults, field by field.
    #[must_use]
    pub fn from_json_str(s: &str) -> Self {
        match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(other) => {
                tracing::warn!(
                    target: "mcol.settings",
                    kind = json_kind(&other),
                    "stored settings are not an object; using defaults"
                );
                Self::default()
            }
            Err(err) => {
                tracing::warn!(
                    target: "mcol.settings",
                    error = %err,
                    "stored settings are not valid JSON; using defaults"
                );
                Self::default()
            }
        }
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(Self::from_json_str(&content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(SettingsError::Io(err)),
        }
    }

    /// Serialize as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to a JSON file, replacing its contents.
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json_string()?)?;
        tracing::debug!(
            target: "mcol.settings",
            path = %path.as_ref().display(),
            "settings saved"
        );
        Ok(())
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            show_borders: field(map, "showBorders", defaults.show_borders),
            border_width: field(map, "borderWidth", defaults.border_width),
            border_color: field(map, "borderColor", defaults.border_color),
            border_transparency: transparency(map, "borderTransparency", defaults.border_transparency),
            show_resizer: field(map, "showResizer", defaults.show_resizer),
            resizer_color: field(map, "resizerColor", defaults.resizer_color),
            resizer_width: field(map, "resizerWidth", defaults.resizer_width),
            resizer_transparency: transparency(
                map,
                "resizerTransparency",
                defaults.resizer_transparency,
            ),
        }
    }

    /// Copy with transparencies clamped into `[0, 100]`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.border_transparency = self.border_transparency.min(100);
        self.resizer_transparency = self.resizer_transparency.min(100);
        self
    }

    /// Border color with its transparency applied.
    #[must_use]
    pub fn border_rgba(&self) -> String {
        to_rgba(&self.border_color, f64::from(self.border_transparency.min(100)))
    }

    /// Resizer color with its transparency applied.
    #[must_use]
    pub fn resizer_rgba(&self) -> String {
        to_rgba(&self.resizer_color, f64::from(self.resizer_transparency.min(100)))
    }

    /// Root CSS variables the host stylesheet reads.
    #[must_use]
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        let border = self.border_rgba();
        let resizer = self.resizer_rgba();
        vec![
            (vars::BORDER_WIDTH, format!("{}px", self.border_width)),
            (
                vars::BORDER_SHOWN,
                if self.show_borders { "solid" } else { "none" }.to_string(),
            ),
            (
                vars::BORDER_COLOR,
                if self.show_borders { border } else { "transparent".to_string() },
            ),
            (
                vars::RESIZER_BG,
                if self.show_resizer {
                    resizer.clone()
                } else {
                    "transparent".to_string()
                },
            ),
            (vars::RESIZER_HOVER_BG, resizer),
            (vars::RESIZER_WIDTH, format!("{}px", self.resizer_width)),
        ]
    }

    /// Apply the border width text field; blank, zero, or junk input restores
    /// the default.
    pub fn set_border_width_input(&mut self, input: &str) {
        self.border_width = width_input(input, Self::default().border_width);
    }

    /// Apply the resizer width text field.
    pub fn set_resizer_width_input(&mut self, input: &str) {
        self.resizer_width = width_input(input, Self::default().resizer_width);
    }

    /// Apply the border transparency text field; junk input means 0.
    pub fn set_border_transparency_input(&mut self, input: &str) {
        self.border_transparency = transparency_input(input);
    }

    /// Apply the resizer transparency text field.
    pub fn set_resizer_transparency_input(&mut self, input: &str) {
        self.resizer_transparency = transparency_input(input);
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = map.get(key) else {
        return default;
    };
    match T::deserialize(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(
                target: "mcol.settings",
                field = key,
                error = %err,
                "malformed settings field; using default"
            );
            default
        }
    }
}

fn transparency(map: &Map<String, Value>, key: &str, default: u8) -> u8 {
    let raw: Option<f64> = field(map, key, None);
    raw.filter(|v| v.is_finite())
        .map_or(default, |v| v.clamp(0.0, 100.0).round() as u8)
}

fn width_input(input: &str, default: u32) -> u32 {
    leading_int(input)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn transparency_input(input: &str) -> u8 {
    leading_int(input).unwrap_or(0).clamp(0, 100) as u8
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
