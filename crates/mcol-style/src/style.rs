#![forbid(unsafe_code)]

//! Resolved column and container styles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback column background: the host theme's primary background.
pub const DEFAULT_BACKGROUND: &str = "var(--background-primary)";

/// Fallback column text color: the host theme's normal text color.
pub const DEFAULT_TEXT_COLOR: &str = "var(--text-normal)";

/// CSS custom properties shared with the host stylesheet.
pub mod vars {
    pub const BORDER_WIDTH: &str = "--sc-border-width";
    pub const BORDER_SHOWN: &str = "--sc-border-shown";
    pub const BORDER_COLOR: &str = "--sc-border-color";
    pub const RESIZER_BG: &str = "--sc-resizer-bg";
    pub const RESIZER_HOVER_BG: &str = "--sc-resizer-hover-bg";
    pub const RESIZER_WIDTH: &str = "--sc-resizer-width";
    pub const COLUMN_BG: &str = "--sc-column-bg";
    pub const COLUMN_TEXT_COLOR: &str = "--sc-column-text-color";
    pub const COLUMN_WIDTH: &str = "--sc-column-width";
}

/// Horizontal text alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Implicit default; never persisted on its own.
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// All alignments in control order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Class that carries this alignment on a column element.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Left => "text-left",
            Self::Center => "text-center",
            Self::Right => "text-right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width of a column: a share of the container or the flex default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    #[default]
    Auto,
    /// Percentage of the container's width.
    Percent(f64),
}

impl ColumnWidth {
    /// Parse a persisted or computed width string.
    ///
    /// Anything that is not a finite `<number>%` reads as [`ColumnWidth::Auto`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .strip_suffix('%')
            .and_then(|n| n.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map_or(Self::Auto, Self::Percent)
    }

    /// The percentage, if this is not `auto`.
    #[must_use]
    pub const fn percent(self) -> Option<f64> {
        match self {
            Self::Auto => None,
            Self::Percent(p) => Some(p),
        }
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Percent(p) => write!(f, "{p:.2}%"),
        }
    }
}

impl Serialize for ColumnWidth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Effective style of one column after merging override and default tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumnStyle {
    pub alignment: Alignment,
    pub background: String,
    pub text_color: String,
    pub width: ColumnWidth,
}

impl Default for ResolvedColumnStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            background: DEFAULT_BACKGROUND.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            width: ColumnWidth::Auto,
        }
    }
}

/// Which tier supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSource {
    /// Persisted per-block override.
    Override,
    /// Derived from [`GlobalSettings`](crate::GlobalSettings).
    Settings,
}

/// Effective block-level border and resizer styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContainerStyle {
    pub border_color: String,
    pub show_border: bool,
    pub border_source: StyleSource,
    pub resizer_color: String,
    pub show_resizer: bool,
    pub resizer_source: StyleSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Alignment::Center).expect("serialize"),
            r#""center""#
        );
        let right: Alignment = serde_json::from_str(r#""right""#).expect("deserialize");
        assert_eq!(right, Alignment::Right);
        assert!(serde_json::from_str::<Alignment>(r#""justify""#).is_err());
        assert_eq!(Alignment::default().class_name(), "text-left");
    }

    #[test]
    fn width_parses_percentages_and_falls_back_to_auto() {
        assert_eq!(ColumnWidth::parse("57.5%"), ColumnWidth::Percent(57.5));
        assert_eq!(ColumnWidth::parse(" 40 % "), ColumnWidth::Percent(40.0));
        assert_eq!(ColumnWidth::parse("auto"), ColumnWidth::Auto);
        assert_eq!(ColumnWidth::parse("200px"), ColumnWidth::Auto);
        assert_eq!(ColumnWidth::parse(""), ColumnWidth::Auto);
        assert_eq!(ColumnWidth::parse("NaN%"), ColumnWidth::Auto);
    }

    #[test]
    fn width_formats_with_two_decimals() {
        assert_eq!(ColumnWidth::Percent(57.5).to_string(), "57.50%");
        assert_eq!(ColumnWidth::Auto.to_string(), "auto");
        let json = serde_json::to_string(&vec![ColumnWidth::Percent(42.5), ColumnWidth::Auto])
            .expect("serialize");
        assert_eq!(json, r#"["42.50%","auto"]"#);
    }
}
