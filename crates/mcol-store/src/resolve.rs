#![forbid(unsafe_code)]

//! Layered style resolution.
//!
//! Each field takes the first tier that is present:
//!
//! ```text
//! persisted override  ->  GlobalSettings-derived  ->  fallback
//! ```
//!
//! Alignment, backgrounds, and text colors have no settings tier. Widths come
//! from the positional width record at `index - 1` and fall back to `auto`.

use mcol_core::{BlockId, ColumnIndex};
use mcol_style::{
    ColumnWidth, DEFAULT_BACKGROUND, DEFAULT_TEXT_COLOR, GlobalSettings, ResolvedColumnStyle,
    ResolvedContainerStyle, StyleSource,
};

use crate::records::{
    AlignmentRecord, BorderRecord, ColorRecord, OverrideRecords, ResizerRecord, WidthRecord,
};
use crate::store::StyleStore;

/// Every override record of one block, read in a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockOverrides {
    pub widths: WidthRecord,
    pub alignments: AlignmentRecord,
    pub backgrounds: ColorRecord,
    pub text_colors: ColorRecord,
    pub border: Option<BorderRecord>,
    pub resizer: Option<ResizerRecord>,
}

impl BlockOverrides {
    /// Read all records of `block`. Missing or malformed records are empty.
    pub fn load<S: StyleStore + ?Sized>(store: &S, block: &BlockId) -> Self {
        Self {
            widths: store.widths(block).unwrap_or_default(),
            alignments: store.alignments(block).unwrap_or_default(),
            backgrounds: store.backgrounds(block).unwrap_or_default(),
            text_colors: store.text_colors(block).unwrap_or_default(),
            border: store.border(block),
            resizer: store.resizer(block),
        }
    }

    /// Resolved style of the column at `index`.
    #[must_use]
    pub fn column(&self, index: ColumnIndex) -> ResolvedColumnStyle {
        ResolvedColumnStyle {
            alignment: self.alignments.get(&index).copied().unwrap_or_default(),
            background: self
                .backgrounds
                .get(&index)
                .cloned()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            text_color: self
                .text_colors
                .get(&index)
                .cloned()
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            width: self
                .widths
                .get(index.position())
                .copied()
                .unwrap_or(ColumnWidth::Auto),
        }
    }

    /// Resolved border and resizer styling.
    #[must_use]
    pub fn container(&self, settings: &GlobalSettings) -> ResolvedContainerStyle {
        let (border_color, show_border, border_source) = match &self.border {
            Some(record) => (record.color.clone(), record.show, StyleSource::Override),
            None => (
                settings.border_rgba(),
                settings.show_borders,
                StyleSource::Settings,
            ),
        };
        let (resizer_color, show_resizer, resizer_source) = match &self.resizer {
            Some(record) => (record.color.clone(), record.show, StyleSource::Override),
            None => (
                settings.resizer_rgba(),
                settings.show_resizer,
                StyleSource::Settings,
            ),
        };
        ResolvedContainerStyle {
            border_color,
            show_border,
            border_source,
            resizer_color,
            show_resizer,
            resizer_source,
        }
    }
}

/// Resolves effective styles from a store.
#[derive(Debug)]
pub struct StyleResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: StyleStore + ?Sized> StyleResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Effective style of one column.
    pub fn resolve(
        &self,
        block: &BlockId,
        index: ColumnIndex,
        _settings: &GlobalSettings,
    ) -> ResolvedColumnStyle {
        self.overrides(block).column(index)
    }

    /// Effective border and resizer styling of one block.
    pub fn resolve_container(
        &self,
        block: &BlockId,
        settings: &GlobalSettings,
    ) -> ResolvedContainerStyle {
        self.overrides(block).container(settings)
    }

    /// Every override of `block`, for resolving many columns at once.
    pub fn overrides(&self, block: &BlockId) -> BlockOverrides {
        BlockOverrides::load(self.store, block)
    }
}
