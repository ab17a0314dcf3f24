#![forbid(unsafe_code)]

//! Writing resolved styles onto live elements.
//!
//! Resolution is pure; this module is the only place that turns a resolved
//! value into surface mutations. [`ApplyStrategy`] picks between custom
//! properties read by the host stylesheet and plain inline CSS.

use mcol_core::{BlockId, ElementId};
use mcol_style::{Alignment, ColumnWidth, ResolvedColumnStyle, vars};

use crate::surface::RenderSurface;

/// Class carried by every column container.
pub const CONTAINER_CLASS: &str = "markdown-columns-resizable";
/// Class carried by every column element.
pub const COLUMN_CLASS: &str = "column";
/// Class that opts a column into the stylesheet's column rules.
pub const COLUMN_STYLE_CLASS: &str = "column-style";
/// Class carried by every resizer element.
pub const RESIZER_CLASS: &str = "column-resizer";
/// Class that keeps a resizer visible outside hover.
pub const RESIZER_VISIBLE_CLASS: &str = "resizer-visible";
/// Body class shown while any drag is in progress.
pub const CURSOR_CLASS: &str = "cursor-col-resize";

const TRANSPARENT: &str = "transparent";

/// How style values reach an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApplyStrategy {
    /// Set the `--sc-*` custom properties the host stylesheet reads.
    #[default]
    CustomProperty,
    /// Set plain CSS properties directly.
    InlineStyle,
}

impl ApplyStrategy {
    /// Property carrying a column's width.
    #[must_use]
    pub const fn width_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::COLUMN_WIDTH,
            Self::InlineStyle => "width",
        }
    }

    #[must_use]
    pub const fn background_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::COLUMN_BG,
            Self::InlineStyle => "background-color",
        }
    }

    #[must_use]
    pub const fn text_color_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::COLUMN_TEXT_COLOR,
            Self::InlineStyle => "color",
        }
    }

    #[must_use]
    pub const fn border_shown_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::BORDER_SHOWN,
            Self::InlineStyle => "border-style",
        }
    }

    #[must_use]
    pub const fn border_color_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::BORDER_COLOR,
            Self::InlineStyle => "border-color",
        }
    }

    #[must_use]
    pub const fn resizer_background_property(self) -> &'static str {
        match self {
            Self::CustomProperty => vars::RESIZER_BG,
            Self::InlineStyle => "background-color",
        }
    }
}

/// Applies resolved styles through one [`ApplyStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleApplier {
    strategy: ApplyStrategy,
}

impl StyleApplier {
    #[must_use]
    pub const fn new(strategy: ApplyStrategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> ApplyStrategy {
        self.strategy
    }

    /// Swap the column's alignment class.
    pub fn apply_alignment<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        column: ElementId,
        alignment: Alignment,
    ) {
        for other in Alignment::ALL {
            surface.remove_class(column, other.class_name());
        }
        surface.add_class(column, alignment.class_name());
    }

    pub fn apply_background<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        column: ElementId,
        color: &str,
    ) {
        surface.set_style_property(column, self.strategy.background_property(), color);
    }

    pub fn apply_text_color<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        column: ElementId,
        color: &str,
    ) {
        surface.set_style_property(column, self.strategy.text_color_property(), color);
    }

    pub fn apply_width<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        column: ElementId,
        width: ColumnWidth,
    ) {
        surface.set_style_property(column, self.strategy.width_property(), &width.to_string());
    }

    /// Width currently carried by the column's width property.
    pub fn read_width<S: RenderSurface + ?Sized>(&self, surface: &S, column: ElementId) -> ColumnWidth {
        surface
            .style_property(column, self.strategy.width_property())
            .map_or(ColumnWidth::Auto, |raw| ColumnWidth::parse(&raw))
    }

    /// Apply every field of a resolved column style.
    pub fn apply_column<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        column: ElementId,
        style: &ResolvedColumnStyle,
    ) {
        self.apply_alignment(surface, column, style.alignment);
        self.apply_background(surface, column, &style.background);
        self.apply_text_color(surface, column, &style.text_color);
        self.apply_width(surface, column, style.width);
    }

    /// Block-level border on the container.
    pub fn apply_border<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        container: ElementId,
        color: &str,
        show: bool,
    ) {
        surface.set_style_property(
            container,
            self.strategy.border_shown_property(),
            if show { "solid" } else { "none" },
        );
        surface.set_style_property(container, self.strategy.border_color_property(), color);
    }

    /// Block-level resizer color on one resizer.
    pub fn apply_resizer<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        resizer: ElementId,
        color: &str,
        show: bool,
    ) {
        surface.toggle_class(resizer, RESIZER_VISIBLE_CLASS, show);
        surface.set_style_property(
            resizer,
            self.strategy.resizer_background_property(),
            if show { color } else { TRANSPARENT },
        );
    }

    /// Strip every inline style so the stylesheet defaults show through.
    pub fn clear<S: RenderSurface + ?Sized>(&self, surface: &mut S, element: ElementId) {
        surface.clear_inline_styles(element);
    }
}

/// Id of the per-block resizer hover rule.
#[must_use]
pub fn hover_rule_id(block: &BlockId) -> String {
    format!("sc-resizer-hover-style-{block}")
}

/// Stylesheet text of the per-block resizer hover rule.
#[must_use]
pub fn hover_rule_css(block: &BlockId, color: &str) -> String {
    format!(
        ".{CONTAINER_CLASS}[id=\"{block}\"] > .{RESIZER_CLASS}:hover {{ background-color: {color} !important; }}"
    )
}

/// Install (or replace) the hover rule of `block`, or remove it when there
/// is no color.
pub fn sync_hover_rule<S: RenderSurface + ?Sized>(
    surface: &mut S,
    block: &BlockId,
    color: Option<&str>,
) {
    let rule_id = hover_rule_id(block);
    match color {
        Some(color) => surface.upsert_style_rule(&rule_id, &hover_rule_css(block, color)),
        None => surface.remove_style_rule(&rule_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    #[test]
    fn custom_property_strategy_writes_sc_variables() {
        let mut surface = MemorySurface::new();
        let column = surface.create_element("div");
        let applier = StyleApplier::default();
        applier.apply_column(
            &mut surface,
            column,
            &ResolvedColumnStyle {
                alignment: Alignment::Center,
                width: ColumnWidth::Percent(40.0),
                ..ResolvedColumnStyle::default()
            },
        );
        let node = surface.element(column).expect("column");
        assert!(node.has_class("text-center"));
        assert_eq!(node.style(vars::COLUMN_WIDTH), Some("40.00%"));
        assert_eq!(node.style(vars::COLUMN_BG), Some("var(--background-primary)"));
        assert_eq!(node.style(vars::COLUMN_TEXT_COLOR), Some("var(--text-normal)"));
        assert_eq!(applier.read_width(&surface, column), ColumnWidth::Percent(40.0));
    }

    #[test]
    fn inline_strategy_writes_plain_css() {
        let mut surface = MemorySurface::new();
        let container = surface.create_element("div");
        let resizer = surface.create_element("div");
        let applier = StyleApplier::new(ApplyStrategy::InlineStyle);
        applier.apply_border(&mut surface, container, "red", false);
        applier.apply_resizer(&mut surface, resizer, "blue", true);
        applier.apply_width(&mut surface, resizer, ColumnWidth::Auto);

        let container = surface.element(container).expect("container");
        assert_eq!(container.style("border-style"), Some("none"));
        assert_eq!(container.style("border-color"), Some("red"));
        let resizer = surface.element(resizer).expect("resizer");
        assert_eq!(resizer.style("background-color"), Some("blue"));
        assert_eq!(resizer.style("width"), Some("auto"));
        assert!(resizer.has_class(RESIZER_VISIBLE_CLASS));
    }

    #[test]
    fn alignment_replaces_previous_class() {
        let mut surface = MemorySurface::new();
        let column = surface.create_element("div");
        let applier = StyleApplier::default();
        applier.apply_alignment(&mut surface, column, Alignment::Right);
        applier.apply_alignment(&mut surface, column, Alignment::Left);
        let node = surface.element(column).expect("column");
        assert!(node.has_class("text-left"));
        assert!(!node.has_class("text-right"));
    }

    #[test]
    fn hidden_resizer_is_transparent() {
        let mut surface = MemorySurface::new();
        let resizer = surface.create_element("div");
        StyleApplier::default().apply_resizer(&mut surface, resizer, "blue", false);
        let node = surface.element(resizer).expect("resizer");
        assert_eq!(node.style(vars::RESIZER_BG), Some("transparent"));
        assert!(!node.has_class(RESIZER_VISIBLE_CLASS));
    }

    #[test]
    fn hover_rule_is_replaced_by_id() {
        let mut surface = MemorySurface::new();
        let block = BlockId::new("b1").expect("valid id");
        sync_hover_rule(&mut surface, &block, Some("red"));
        sync_hover_rule(&mut surface, &block, Some("blue"));
        assert_eq!(surface.style_rule_count(), 1);
        assert_eq!(
            surface.style_rule("sc-resizer-hover-style-b1"),
            Some(
                ".markdown-columns-resizable[id=\"b1\"] > .column-resizer:hover { background-color: blue !important; }"
            )
        );
        sync_hover_rule(&mut surface, &block, None);
        assert_eq!(surface.style_rule_count(), 0);
    }
}
