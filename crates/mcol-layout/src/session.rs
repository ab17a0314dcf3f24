#![forbid(unsafe_code)]

//! Draft editing of one block's style overrides.
//!
//! A [`CustomizationSession`] is opened for a block, mutated freely, and
//! closed exactly once. Mutations only touch the draft. Closing consumes the
//! session, applies the draft to the live elements, and persists it:
//!
//! - border and resizer are always applied and persisted;
//! - alignments are applied to every column and persisted as the non-left
//!   entries, or the record is removed when every column is left;
//! - backgrounds and text colors are applied and persisted only when the
//!   draft map is non-empty.
//!
//! [`CustomizationSession::reset`] is the exception: it deletes the block's
//! style records and strips inline styles immediately, then keeps the
//! session open with settings-derived drafts.

use mcol_core::{BlockId, ColumnIndex};
use mcol_store::{
    AlignmentRecord, BlockOverrides, ColorRecord, OverrideRecords, StorageResult, StyleDimension,
    StyleStore, ToggleColor,
};
use mcol_style::color::{alpha_percent, parse_alpha_input, to_hex, with_alpha, with_hex};
use mcol_style::{Alignment, DEFAULT_BACKGROUND, DEFAULT_TEXT_COLOR, GlobalSettings};

use crate::apply::sync_hover_rule;
use crate::renderer::LayoutHandles;
use crate::surface::RenderSurface;

/// A draft mutation addressed a column the block does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("column {index} is out of range for a block of {column_count} columns")]
pub struct ColumnOutOfRange {
    pub index: ColumnIndex,
    pub column_count: usize,
}

/// What a close wrote and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub written: Vec<StyleDimension>,
    pub removed: Vec<StyleDimension>,
}

/// Open customization draft of one block.
#[derive(Debug, Clone)]
pub struct CustomizationSession {
    block: BlockId,
    column_count: usize,
    target: Option<LayoutHandles>,
    border: ToggleColor,
    resizer: ToggleColor,
    alignments: AlignmentRecord,
    backgrounds: ColorRecord,
    text_colors: ColorRecord,
    generation: u64,
}

impl CustomizationSession {
    /// Open a session.
    ///
    /// Border and resizer drafts come from the block's overrides, else from
    /// `settings`; per-column maps are the persisted entries of columns the
    /// block still has. `target` is the
    /// live layout to re-apply to, if the block is on screen.
    pub fn open<St: StyleStore + ?Sized>(
        block: BlockId,
        column_count: usize,
        target: Option<LayoutHandles>,
        settings: &GlobalSettings,
        store: &St,
    ) -> Self {
        let mut overrides = BlockOverrides::load(store, &block);
        let chrome = overrides.container(settings);
        let in_block = |index: &ColumnIndex| index.position() < column_count;
        overrides.alignments.retain(|index, _| in_block(index));
        overrides.backgrounds.retain(|index, _| in_block(index));
        overrides.text_colors.retain(|index, _| in_block(index));
        tracing::debug!(target: "mcol.session", block_id = %block, column_count, "session opened");
        Self {
            block,
            column_count,
            target,
            border: ToggleColor::new(chrome.border_color, chrome.show_border),
            resizer: ToggleColor::new(chrome.resizer_color, chrome.show_resizer),
            alignments: overrides.alignments,
            backgrounds: overrides.backgrounds,
            text_colors: overrides.text_colors,
            generation: 0,
        }
    }

    #[must_use]
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.column_count
    }

    /// Bumped by every reset; controls rebuild when it changes.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn border(&self) -> &ToggleColor {
        &self.border
    }

    #[must_use]
    pub fn resizer(&self) -> &ToggleColor {
        &self.resizer
    }

    #[must_use]
    pub fn alignments(&self) -> &AlignmentRecord {
        &self.alignments
    }

    #[must_use]
    pub fn backgrounds(&self) -> &ColorRecord {
        &self.backgrounds
    }

    #[must_use]
    pub fn text_colors(&self) -> &ColorRecord {
        &self.text_colors
    }

    // -- block-level controls --------------------------------------------

    pub fn set_show_border(&mut self, show: bool) {
        self.border.show = show;
    }

    /// Pick a new border color, keeping the current alpha.
    pub fn set_border_hex(&mut self, hex: &str) {
        self.border.color = with_hex(&self.border.color, hex);
    }

    /// Apply the border transparency field. Ignored unless the draft is an
    /// `rgb(r, g, b, a)` color.
    pub fn set_border_alpha_input(&mut self, input: &str) {
        if let Some(color) = with_alpha(&self.border.color, f64::from(parse_alpha_input(input))) {
            self.border.color = color;
        }
    }

    pub fn set_show_resizer(&mut self, show: bool) {
        self.resizer.show = show;
    }

    pub fn set_resizer_hex(&mut self, hex: &str) {
        self.resizer.color = with_hex(&self.resizer.color, hex);
    }

    pub fn set_resizer_alpha_input(&mut self, input: &str) {
        if let Some(color) = with_alpha(&self.resizer.color, f64::from(parse_alpha_input(input))) {
            self.resizer.color = color;
        }
    }

    /// Value of the border color picker.
    #[must_use]
    pub fn border_hex(&self) -> String {
        to_hex(&self.border.color)
    }

    /// Value of the border transparency field.
    #[must_use]
    pub fn border_alpha(&self) -> u8 {
        alpha_percent(&self.border.color).unwrap_or(100)
    }

    #[must_use]
    pub fn resizer_hex(&self) -> String {
        to_hex(&self.resizer.color)
    }

    #[must_use]
    pub fn resizer_alpha(&self) -> u8 {
        alpha_percent(&self.resizer.color).unwrap_or(100)
    }

    // -- per-column controls ---------------------------------------------

    /// Draft alignment of a column (left when unset).
    #[must_use]
    pub fn alignment(&self, index: ColumnIndex) -> Alignment {
        self.alignments.get(&index).copied().unwrap_or_default()
    }

    pub fn set_alignment(
        &mut self,
        index: ColumnIndex,
        alignment: Alignment,
    ) -> Result<(), ColumnOutOfRange> {
        self.check(index)?;
        self.alignments.insert(index, alignment);
        Ok(())
    }

    pub fn set_text_color(
        &mut self,
        index: ColumnIndex,
        color: impl Into<String>,
    ) -> Result<(), ColumnOutOfRange> {
        self.check(index)?;
        self.text_colors.insert(index, color.into());
        Ok(())
    }

    /// Value of a column's text color picker.
    #[must_use]
    pub fn text_color(&self, index: ColumnIndex) -> &str {
        self.text_colors
            .get(&index)
            .map_or(DEFAULT_TEXT_COLOR, String::as_str)
    }

    /// Pick a background color, keeping the alpha of the current draft.
    pub fn set_background_hex(
        &mut self,
        index: ColumnIndex,
        hex: &str,
    ) -> Result<(), ColumnOutOfRange> {
        self.check(index)?;
        let color = with_hex(self.background(index), hex);
        self.backgrounds.insert(index, color);
        Ok(())
    }

    /// Apply a column's background transparency field. Ignored until the
    /// background is an `rgb(r, g, b, a)` color.
    pub fn set_background_alpha_input(
        &mut self,
        index: ColumnIndex,
        input: &str,
    ) -> Result<(), ColumnOutOfRange> {
        self.check(index)?;
        if let Some(color) = with_alpha(self.background(index), f64::from(parse_alpha_input(input)))
        {
            self.backgrounds.insert(index, color);
        }
        Ok(())
    }

    /// Draft background of a column.
    #[must_use]
    pub fn background(&self, index: ColumnIndex) -> &str {
        self.backgrounds
            .get(&index)
            .map_or(DEFAULT_BACKGROUND, String::as_str)
    }

    #[must_use]
    pub fn background_hex(&self, index: ColumnIndex) -> String {
        to_hex(self.background(index))
    }

    #[must_use]
    pub fn background_alpha(&self, index: ColumnIndex) -> u8 {
        alpha_percent(self.background(index)).unwrap_or(100)
    }

    // -- lifecycle -------------------------------------------------------

    /// Restore every style of the block to its default.
    ///
    /// Deletes the block's style records, strips inline styles from the live
    /// container, columns, and resizers, and resets the drafts to the
    /// settings-derived values. Widths are untouched in storage. The session
    /// stays open.
    pub fn reset<S, St>(
        &mut self,
        surface: &mut S,
        store: &mut St,
        settings: &GlobalSettings,
    ) -> StorageResult<()>
    where
        S: RenderSurface + ?Sized,
        St: StyleStore + ?Sized,
    {
        self.border = ToggleColor::new(settings.border_rgba(), settings.show_borders);
        self.resizer = ToggleColor::new(settings.resizer_rgba(), settings.show_resizer);
        self.alignments.clear();
        self.backgrounds.clear();
        self.text_colors.clear();

        store.clear_block_styles(&self.block)?;

        if let Some(target) = &self.target {
            target.applier.clear(surface, target.container);
            for column in target.columns.iter().take(self.column_count) {
                target.applier.clear(surface, *column);
            }
            for resizer in &target.resizers {
                target.applier.clear(surface, *resizer);
            }
        }
        sync_hover_rule(surface, &self.block, None);

        self.generation += 1;
        tracing::debug!(
            target: "mcol.session",
            block_id = %self.block,
            generation = self.generation,
            "block styles reset"
        );
        Ok(())
    }

    /// Apply and persist the draft, ending the session.
    pub fn close<S, St>(self, surface: &mut S, store: &mut St) -> StorageResult<CommitReport>
    where
        S: RenderSurface + ?Sized,
        St: StyleStore + ?Sized,
    {
        let span = tracing::debug_span!(target: "mcol.session", "commit_session", block_id = %self.block);
        let _guard = span.enter();
        let mut report = CommitReport::default();

        if let Some(target) = &self.target {
            target
                .applier
                .apply_border(surface, target.container, &self.border.color, self.border.show);
            for resizer in &target.resizers {
                target
                    .applier
                    .apply_resizer(surface, *resizer, &self.resizer.color, self.resizer.show);
            }
            sync_hover_rule(surface, &self.block, Some(&self.resizer.color));
        }
        store.save_record(StyleDimension::BorderColor, &self.block, &self.border)?;
        report.written.push(StyleDimension::BorderColor);
        store.save_record(StyleDimension::ResizerColor, &self.block, &self.resizer)?;
        report.written.push(StyleDimension::ResizerColor);

        if let Some(target) = &self.target {
            for index in ColumnIndex::range(self.column_count) {
                if let Some(column) = target.columns.get(index.position()) {
                    target
                        .applier
                        .apply_alignment(surface, *column, self.alignment(index));
                }
            }
        }
        store.save_alignments(&self.block, &self.alignments)?;
        if self.alignments.values().all(|a| *a == Alignment::Left) {
            report.removed.push(StyleDimension::ColumnAlignments);
        } else {
            report.written.push(StyleDimension::ColumnAlignments);
        }

        if !self.text_colors.is_empty() {
            if let Some(target) = &self.target {
                for (index, color) in &self.text_colors {
                    if let Some(column) = target.columns.get(index.position()) {
                        target.applier.apply_text_color(surface, *column, color);
                    }
                }
            }
            store.save_record(StyleDimension::ColumnTextColors, &self.block, &self.text_colors)?;
            report.written.push(StyleDimension::ColumnTextColors);
        }

        if !self.backgrounds.is_empty() {
            if let Some(target) = &self.target {
                for (index, color) in &self.backgrounds {
                    if let Some(column) = target.columns.get(index.position()) {
                        target.applier.apply_background(surface, *column, color);
                    }
                }
            }
            store.save_record(StyleDimension::ColumnBackgrounds, &self.block, &self.backgrounds)?;
            report.written.push(StyleDimension::ColumnBackgrounds);
        }

        tracing::debug!(
            target: "mcol.session",
            written = report.written.len(),
            removed = report.removed.len(),
            "session committed"
        );
        Ok(report)
    }

    fn check(&self, index: ColumnIndex) -> Result<(), ColumnOutOfRange> {
        if index.position() < self.column_count {
            Ok(())
        } else {
            Err(ColumnOutOfRange {
                index,
                column_count: self.column_count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::RESIZER_VISIBLE_CLASS;
    use crate::renderer::{ColumnLayout, ColumnLayoutRenderer, PlainTextRenderer, RenderContext};
    use crate::surface::MemorySurface;
    use mcol_store::MemoryStore;
    use mcol_style::vars;
    use pollster::block_on;

    fn idx(raw: u32) -> ColumnIndex {
        ColumnIndex::new(raw).expect("non-zero")
    }

    fn setup(store: &MemoryStore) -> (MemorySurface, ColumnLayout) {
        let mut surface = MemorySurface::new();
        let host = surface.create_host(400.0);
        let layout = block_on(ColumnLayoutRenderer::default().render(
            &mut surface,
            host,
            "id: b1\n===\nleft\n===\nright\n",
            RenderContext {
                source_path: "a.md",
                live_preview: true,
            },
            &GlobalSettings::default(),
            store,
            &PlainTextRenderer,
        ))
        .expect("render");
        (surface, layout)
    }

    #[test]
    fn drafts_start_from_settings_without_overrides() {
        let store = MemoryStore::new();
        let (_surface, layout) = setup(&store);
        let settings = GlobalSettings {
            border_color: "#ff0000".into(),
            border_transparency: 50,
            show_resizer: false,
            ..GlobalSettings::default()
        };
        let session = layout.open_session(&settings, &store);
        assert_eq!(session.border().color, "rgb(255, 0, 0, 0.50)");
        assert_eq!(session.border_hex(), "#ff0000");
        assert_eq!(session.border_alpha(), 50);
        assert!(!session.resizer().show);
        assert!(session.alignments().is_empty());
    }

    #[test]
    fn mutations_touch_only_the_draft() {
        let store = MemoryStore::new();
        let (surface, layout) = setup(&store);
        let mut session = layout.open_session(&GlobalSettings::default(), &store);
        session.set_alignment(idx(1), Alignment::Center).expect("in range");
        session.set_border_hex("#0000ff");
        session.set_show_border(false);
        assert!(store.is_empty());
        let column = surface.element(layout.columns()[0]).expect("column");
        assert!(column.has_class("text-left"));
        assert_eq!(
            session.set_alignment(idx(3), Alignment::Right),
            Err(ColumnOutOfRange {
                index: idx(3),
                column_count: 2
            })
        );
    }

    #[test]
    fn entries_past_the_last_column_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .set("columnAlignments-b1", r#"{"3":"center"}"#.into())
            .expect("set");
        store
            .set("columnTextColors-b1", r##"{"2":"#111111","5":"#222222"}"##.into())
            .expect("set");
        let (mut surface, layout) = setup(&store);
        let mut session = layout.open_session(&GlobalSettings::default(), &store);
        assert!(session.alignments().is_empty());
        assert_eq!(session.text_colors().len(), 1);

        session.set_alignment(idx(1), Alignment::Left).expect("in range");
        session.set_alignment(idx(2), Alignment::Left).expect("in range");
        let report = session.close(&mut surface, &mut store).expect("commit");
        assert!(report.removed.contains(&StyleDimension::ColumnAlignments));
        assert_eq!(store.get("columnAlignments-b1"), None);
        assert_eq!(
            store.get("columnTextColors-b1").as_deref(),
            Some(r##"{"2":"#111111"}"##)
        );
    }

    #[test]
    fn close_with_all_left_alignments_removes_the_record() {
        let mut store = MemoryStore::new();
        store
            .set("columnAlignments-b1", r#"{"1":"right"}"#.into())
            .expect("set");
        let (mut surface, layout) = setup(&store);
        let mut session = layout.open_session(&GlobalSettings::default(), &store);
        session.set_alignment(idx(1), Alignment::Left).expect("in range");
        session.set_alignment(idx(2), Alignment::Left).expect("in range");
        let report = session.close(&mut surface, &mut store).expect("commit");

        assert!(!store.contains("columnAlignments-b1"));
        assert!(report.removed.contains(&StyleDimension::ColumnAlignments));
        assert!(store.contains("borderColor-b1"));
        assert!(store.contains("resizerColor-b1"));
        assert!(!store.contains("columnBackgrounds-b1"));
        assert!(!store.contains("columnTextColors-b1"));
        let column = surface.element(layout.columns()[0]).expect("column");
        assert!(column.has_class("text-left"));
        assert!(!column.has_class("text-right"));
    }

    #[test]
    fn close_persists_non_left_alignments_and_non_empty_maps() {
        let mut store = MemoryStore::new();
        let (mut surface, layout) = setup(&store);
        let mut session = layout.open_session(&GlobalSettings::default(), &store);
        session.set_alignment(idx(1), Alignment::Left).expect("in range");
        session.set_alignment(idx(2), Alignment::Center).expect("in range");
        session.set_background_hex(idx(1), "#00ff00").expect("in range");
        session.set_background_alpha_input(idx(1), "40").expect("in range");
        session.set_show_resizer(false);
        let report = session.close(&mut surface, &mut store).expect("commit");

        assert_eq!(
            store.get("columnAlignments-b1").as_deref(),
            Some(r#"{"2":"center"}"#)
        );
        assert_eq!(
            store.get("columnBackgrounds-b1").as_deref(),
            Some(r#"{"1":"rgb(0, 255, 0, 0.40)"}"#)
        );
        assert!(report.written.contains(&StyleDimension::ColumnBackgrounds));
        assert!(!report.written.contains(&StyleDimension::ColumnTextColors));

        let first = surface.element(layout.columns()[0]).expect("column");
        assert_eq!(first.style(vars::COLUMN_BG), Some("rgb(0, 255, 0, 0.40)"));
        let second = surface.element(layout.columns()[1]).expect("column");
        assert!(second.has_class("text-center"));
        let resizer = surface.element(layout.resizers()[0]).expect("resizer");
        assert_eq!(resizer.style(vars::RESIZER_BG), Some("transparent"));
        assert!(!resizer.has_class(RESIZER_VISIBLE_CLASS));
        assert!(surface.style_rule("sc-resizer-hover-style-b1").is_some());
    }

    #[test]
    fn reset_clears_every_style_record_and_inline_style() {
        let mut store = MemoryStore::new();
        store.set("column-widths-b1", r#"["60.00%","40.00%"]"#.into()).expect("set");
        store.set("columnTextColors-b1", r#"{"1":"red"}"#.into()).expect("set");
        store.set("borderColor-b1", r#"{"color":"red","show":true}"#.into()).expect("set");
        store.set("resizerColor-b1", r#"{"color":"red","show":true}"#.into()).expect("set");
        let (mut surface, layout) = setup(&store);
        assert!(surface.style_rule("sc-resizer-hover-style-b1").is_some());

        let settings = GlobalSettings::default();
        let mut session = layout.open_session(&settings, &store);
        assert_eq!(session.text_color(idx(1)), "red");
        session.reset(&mut surface, &mut store, &settings).expect("reset");

        for dimension in StyleDimension::STYLE {
            assert!(!store.contains(&dimension.key(layout.block_id())), "{dimension}");
        }
        assert!(store.contains("column-widths-b1"));
        assert!(surface.element(layout.container()).expect("container").styles().is_empty());
        for column in layout.columns() {
            assert!(surface.element(*column).expect("column").styles().is_empty());
        }
        assert_eq!(surface.style_rule_count(), 0);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.border().color, settings.border_rgba());
        assert!(session.text_colors().is_empty());
        assert_eq!(session.text_color(idx(1)), DEFAULT_TEXT_COLOR);
    }

    #[test]
    fn alpha_input_keeps_channels_and_defaults_to_opaque() {
        let store = MemoryStore::new();
        let (_surface, layout) = setup(&store);
        let mut session = layout.open_session(&GlobalSettings::default(), &store);
        session.set_border_hex("#102030");
        session.set_border_alpha_input("25");
        assert_eq!(session.border().color, "rgb(16, 32, 48, 0.25)");
        session.set_border_alpha_input("abc");
        assert_eq!(session.border_alpha(), 100);

        session.set_background_alpha_input(idx(2), "10").expect("in range");
        assert_eq!(session.background(idx(2)), DEFAULT_BACKGROUND);
    }

    #[test]
    fn session_without_live_layout_only_persists() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let block = BlockId::new("offscreen").expect("valid id");
        let mut session =
            CustomizationSession::open(block, 3, None, &GlobalSettings::default(), &store);
        session.set_text_color(idx(3), "blue").expect("in range");
        let report = session.close(&mut surface, &mut store).expect("commit");
        assert_eq!(
            store.get("columnTextColors-offscreen").as_deref(),
            Some(r#"{"3":"blue"}"#)
        );
        assert_eq!(report.written.len(), 3);
        assert_eq!(report.removed, vec![StyleDimension::ColumnAlignments]);
    }
}
