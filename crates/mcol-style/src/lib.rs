#![forbid(unsafe_code)]

//! Style vocabulary for mcol column blocks.
//!
//! # Role in mcol
//! `mcol-style` is the shared vocabulary for colors and column styling. The
//! store, resolver, renderer, and customization session all speak these types
//! so that a color picked in one place reads the same everywhere.
//!
//! # This crate provides
//! - [`color`]: conversions between hex/hsl/rgb and the canonical
//!   `rgb(r, g, b, a)` form with explicit alpha.
//! - [`GlobalSettings`]: process-wide border/resizer configuration with
//!   lenient JSON loading.
//! - [`Alignment`], [`ColumnWidth`], [`ResolvedColumnStyle`], and
//!   [`ResolvedContainerStyle`]: the output of style resolution.
//! - [`vars`]: the CSS custom properties shared with the host stylesheet.

/// Color parsing and conversion.
pub mod color;
/// Global border and resizer settings.
pub mod settings;
/// Resolved style types.
pub mod style;

pub use settings::{GlobalSettings, SettingsError};
pub use style::{
    Alignment, ColumnWidth, DEFAULT_BACKGROUND, DEFAULT_TEXT_COLOR, ResolvedColumnStyle,
    ResolvedContainerStyle, StyleSource, vars,
};
