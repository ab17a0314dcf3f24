#![forbid(unsafe_code)]

//! Color conversions into the canonical `rgb(r, g, b, a)` form.
//!
//! Every color that flows through mcol ends up as `rgb(r, g, b, a)` with an
//! explicit alpha formatted to two decimals, whatever space the user picked
//! it in. All functions are total: input they cannot parse comes back
//! unchanged.
//!
//! ```
//! use mcol_style::color::{to_hex, to_rgba};
//!
//! assert_eq!(to_rgba("#ff0000", 50.0), "rgb(255, 0, 0, 0.50)");
//! assert_eq!(to_rgba("hsl(120, 100%, 50%)", 100.0), "rgb(0, 255, 0, 1.00)");
//! assert_eq!(to_hex("rgb(255, 0, 0, 0.50)"), "#ff0000");
//! assert_eq!(to_rgba("rebeccapurple", 50.0), "rebeccapurple");
//! ```

use std::sync::LazyLock;

use regex_lite::Regex;

static HSL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^hsl\((\d+),\s*(\d+)%?,\s*(\d+)%?\)$").expect("hsl pattern is valid")
});

static RGBA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgb\((\d+),\s*(\d+),\s*(\d+),\s*([\d.]+)\)$").expect("rgba pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

/// Clamp an alpha percentage into `[0, 100]` and scale it to `[0, 1]`.
///
/// NaN is treated as fully opaque.
#[must_use]
pub fn alpha_fraction(alpha_percent: f64) -> f64 {
    if alpha_percent.is_nan() {
        return 1.0;
    }
    alpha_percent.clamp(0.0, 100.0) / 100.0
}

/// Convert any supported color to `rgb(r, g, b, a)` with the given alpha.
///
/// Dispatches on the `#`, `hsl(`, and `rgb(` prefixes; anything else is
/// returned verbatim.
#[must_use]
pub fn to_rgba(color: &str, alpha_percent: f64) -> String {
    if color.starts_with('#') {
        hex_to_rgba(color, alpha_percent)
    } else if color.starts_with("hsl(") {
        hsl_to_rgba(color, alpha_percent)
    } else if color.starts_with("rgb(") {
        rgba_scale_alpha(color, alpha_percent)
    } else {
        color.to_string()
    }
}

/// `#rrggbb` → `rgb(r, g, b, a)`. Short forms and alpha channels are not
/// accepted and come back unchanged.
#[must_use]
pub fn hex_to_rgba(hex: &str, alpha_percent: f64) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => format_rgba(r, g, b, alpha_fraction(alpha_percent)),
        None => hex.to_string(),
    }
}

/// `hsl(H, S%, L%)` → `rgb(r, g, b, a)`.
#[must_use]
pub fn hsl_to_rgba(hsl: &str, alpha_percent: f64) -> String {
    let Some(caps) = HSL.captures(hsl) else {
        return hsl.to_string();
    };
    let component = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    let (Some(h), Some(s), Some(l)) = (component(1), component(2), component(3)) else {
        return hsl.to_string();
    };
    let (r, g, b) = hsl_channels(h, s / 100.0, l / 100.0);
    format_rgba(r, g, b, alpha_fraction(alpha_percent))
}

/// Scale the alpha of an existing `rgb(r, g, b, a)` value.
///
/// The stored alpha is clamped to `[0, 1]` and multiplied by the percentage.
/// Three-component `rgb(...)` values are returned unchanged.
#[must_use]
pub fn rgba_scale_alpha(rgba: &str, alpha_percent: f64) -> String {
    match parse_rgba(rgba) {
        Some((r, g, b, a)) => format_rgba(r, g, b, a.clamp(0.0, 1.0) * alpha_fraction(alpha_percent)),
        None => rgba.to_string(),
    }
}

/// Extract the first three numbers of a color and format them as `#rrggbb`.
///
/// Channels above 255 are clamped; input with fewer than three numbers is
/// returned unchanged.
#[must_use]
pub fn to_hex(rgb: &str) -> String {
    let channels: Vec<u8> = NUMBER
        .find_iter(rgb)
        .take(3)
        .map(|m| m.as_str().parse::<u64>().map_or(255, |v| v.min(255) as u8))
        .collect();
    match channels.as_slice() {
        [r, g, b] => format!("#{r:02x}{g:02x}{b:02x}"),
        _ => rgb.to_string(),
    }
}

/// Alpha of an `rgb(r, g, b, a)` value as a rounded percentage.
#[must_use]
pub fn alpha_percent(rgba: &str) -> Option<u8> {
    let (_, _, _, a) = parse_rgba(rgba)?;
    Some((a.clamp(0.0, 1.0) * 100.0).round() as u8)
}

/// Replace the alpha of an `rgb(r, g, b, a)` value, keeping its channels.
#[must_use]
pub fn with_alpha(rgba: &str, alpha_percent: f64) -> Option<String> {
    let (r, g, b, _) = parse_rgba(rgba)?;
    Some(format_rgba(r, g, b, alpha_fraction(alpha_percent)))
}

/// Recolor to `hex`, keeping the alpha of `current` (opaque when `current`
/// carries none).
#[must_use]
pub fn with_hex(current: &str, hex: &str) -> String {
    let alpha = alpha_percent(current).map_or(100.0, f64::from);
    hex_to_rgba(hex, alpha)
}

/// Parse a transparency text field. Input that does not start with a number
/// means fully opaque.
#[must_use]
pub fn parse_alpha_input(input: &str) -> u8 {
    match leading_int(input) {
        Some(value) => value.clamp(0, 100) as u8,
        None => 100,
    }
}

/// Parse the leading integer of a text field the way form inputs do:
/// surrounding whitespace and trailing junk are ignored (`"12px"` → 12).
#[must_use]
pub fn leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if hex.len() != 7 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_rgba(rgba: &str) -> Option<(u8, u8, u8, f64)> {
    let caps = RGBA.captures(rgba)?;
    let channel = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|v| v.min(255) as u8)
    };
    let alpha = caps.get(4)?.as_str().parse::<f64>().ok()?;
    Some((channel(1)?, channel(2)?, channel(3)?, alpha))
}

fn hsl_channels(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

fn format_rgba(r: u8, g: u8, b: u8, alpha: f64) -> String {
    format!("rgb({r}, {g}, {b}, {alpha:.2})")
}
