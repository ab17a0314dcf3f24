#![forbid(unsafe_code)]

//! Typed per-block override records.
//!
//! Every record lives under `<dimension>-<blockId>` in a [`StyleStore`]:
//!
//! | Dimension | JSON shape |
//! |---|---|
//! | `column-widths` | `["57.50%", "42.50%"]` (positional) |
//! | `columnAlignments` | `{"2": "center"}` |
//! | `columnBackgrounds` | `{"1": "rgb(255, 0, 0, 0.50)"}` |
//! | `columnTextColors` | `{"1": "rgb(0, 0, 0, 1.00)"}` |
//! | `borderColor` | `{"color": "rgb(...)", "show": true}` |
//! | `resizerColor` | `{"color": "rgb(...)", "show": false}` |
//!
//! Reads are lenient: a record that fails to decode is logged and treated as
//! absent.

use std::collections::BTreeMap;
use std::fmt;

use mcol_core::{BlockId, ColumnIndex};
use mcol_style::{Alignment, ColumnWidth};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::{StorageResult, StyleStore};

/// One persisted style dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleDimension {
    ColumnWidths,
    ColumnAlignments,
    ColumnBackgrounds,
    ColumnTextColors,
    BorderColor,
    ResizerColor,
}

impl StyleDimension {
    /// Every dimension.
    pub const ALL: [Self; 6] = [
        Self::ColumnWidths,
        Self::ColumnAlignments,
        Self::ColumnBackgrounds,
        Self::ColumnTextColors,
        Self::BorderColor,
        Self::ResizerColor,
    ];

    /// The dimensions a style reset clears. Widths are layout, not style.
    pub const STYLE: [Self; 5] = [
        Self::ColumnAlignments,
        Self::ColumnBackgrounds,
        Self::ColumnTextColors,
        Self::BorderColor,
        Self::ResizerColor,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColumnWidths => "column-widths",
            Self::ColumnAlignments => "columnAlignments",
            Self::ColumnBackgrounds => "columnBackgrounds",
            Self::ColumnTextColors => "columnTextColors",
            Self::BorderColor => "borderColor",
            Self::ResizerColor => "resizerColor",
        }
    }

    /// Storage key of this dimension for `block`.
    #[must_use]
    pub fn key(self, block: &BlockId) -> String {
        format!("{}-{}", self.as_str(), block)
    }
}

impl fmt::Display for StyleDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional column widths, one entry per column.
pub type WidthRecord = Vec<ColumnWidth>;

/// Sparse per-column alignment overrides.
pub type AlignmentRecord = BTreeMap<ColumnIndex, Alignment>;

/// Sparse per-column color overrides (backgrounds or text colors).
pub type ColorRecord = BTreeMap<ColumnIndex, String>;

/// A block-level color with a visibility flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleColor {
    pub color: String,
    pub show: bool,
}

impl ToggleColor {
    #[must_use]
    pub fn new(color: impl Into<String>, show: bool) -> Self {
        Self {
            color: color.into(),
            show,
        }
    }
}

/// Border override of one block.
pub type BorderRecord = ToggleColor;

/// Resizer override of one block.
pub type ResizerRecord = ToggleColor;

/// Typed record access for any [`StyleStore`].
pub trait OverrideRecords: StyleStore {
    /// Decode the record of `dimension` for `block`.
    ///
    /// Missing and malformed records both read as `None`; malformed ones are
    /// logged.
    fn load_record<T: DeserializeOwned>(
        &self,
        dimension: StyleDimension,
        block: &BlockId,
    ) -> Option<T> {
        let key = dimension.key(block);
        let raw = self.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    target: "mcol.store",
                    %key,
                    error = %err,
                    "ignoring malformed override record"
                );
                None
            }
        }
    }

    /// Encode and store a record.
    fn save_record<T: Serialize + ?Sized>(
        &mut self,
        dimension: StyleDimension,
        block: &BlockId,
        record: &T,
    ) -> StorageResult<()> {
        let json = serde_json::to_string(record)?;
        self.set(&dimension.key(block), json)
    }

    /// Delete the record of `dimension` for `block`.
    fn remove_record(&mut self, dimension: StyleDimension, block: &BlockId) -> StorageResult<()> {
        self.remove(&dimension.key(block))
    }

    fn widths(&self, block: &BlockId) -> Option<WidthRecord> {
        self.load_record(StyleDimension::ColumnWidths, block)
    }

    fn alignments(&self, block: &BlockId) -> Option<AlignmentRecord> {
        self.load_record(StyleDimension::ColumnAlignments, block)
    }

    fn backgrounds(&self, block: &BlockId) -> Option<ColorRecord> {
        self.load_record(StyleDimension::ColumnBackgrounds, block)
    }

    fn text_colors(&self, block: &BlockId) -> Option<ColorRecord> {
        self.load_record(StyleDimension::ColumnTextColors, block)
    }

    fn border(&self, block: &BlockId) -> Option<BorderRecord> {
        self.load_record(StyleDimension::BorderColor, block)
    }

    fn resizer(&self, block: &BlockId) -> Option<ResizerRecord> {
        self.load_record(StyleDimension::ResizerColor, block)
    }

    /// Persist alignments, keeping only non-left entries. An all-left map
    /// deletes the record instead.
    fn save_alignments(&mut self, block: &BlockId, alignments: &AlignmentRecord) -> StorageResult<()> {
        let non_left: AlignmentRecord = alignments
            .iter()
            .filter(|(_, alignment)| **alignment != Alignment::Left)
            .map(|(index, alignment)| (*index, *alignment))
            .collect();
        if non_left.is_empty() {
            self.remove_record(StyleDimension::ColumnAlignments, block)
        } else {
            self.save_record(StyleDimension::ColumnAlignments, block, &non_left)
        }
    }

    /// Remove every style record of `block`. Widths are kept.
    fn clear_block_styles(&mut self, block: &BlockId) -> StorageResult<()> {
        for dimension in StyleDimension::STYLE {
            self.remove_record(dimension, block)?;
        }
        tracing::debug!(target: "mcol.store", block_id = %block, "cleared block styles");
        Ok(())
    }
}

impl<S: StyleStore + ?Sized> OverrideRecords for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn block() -> BlockId {
        BlockId::new("b1").expect("valid id")
    }

    fn idx(raw: u32) -> ColumnIndex {
        ColumnIndex::new(raw).expect("non-zero")
    }

    #[test]
    fn keys_follow_dimension_dash_block() {
        assert_eq!(StyleDimension::ColumnWidths.key(&block()), "column-widths-b1");
        assert_eq!(StyleDimension::BorderColor.key(&block()), "borderColor-b1");
        assert!(!StyleDimension::STYLE.contains(&StyleDimension::ColumnWidths));
    }

    #[test]
    fn records_use_the_documented_json_shapes() {
        let mut store = MemoryStore::new();
        store
            .save_record(
                StyleDimension::ColumnWidths,
                &block(),
                &vec![ColumnWidth::Percent(57.5), ColumnWidth::Percent(42.5)],
            )
            .expect("save");
        assert_eq!(
            store.get("column-widths-b1").as_deref(),
            Some(r#"["57.50%","42.50%"]"#)
        );

        store
            .save_record(
                StyleDimension::BorderColor,
                &block(),
                &ToggleColor::new("rgb(1, 2, 3, 1.00)", false),
            )
            .expect("save");
        assert_eq!(
            store.get("borderColor-b1").as_deref(),
            Some(r#"{"color":"rgb(1, 2, 3, 1.00)","show":false}"#)
        );

        let mut backgrounds = ColorRecord::new();
        backgrounds.insert(idx(2), "red".into());
        store
            .save_record(StyleDimension::ColumnBackgrounds, &block(), &backgrounds)
            .expect("save");
        assert_eq!(
            store.get("columnBackgrounds-b1").as_deref(),
            Some(r#"{"2":"red"}"#)
        );
        assert_eq!(store.backgrounds(&block()), Some(backgrounds));
    }

    #[test]
    fn malformed_records_read_as_absent() {
        let mut store = MemoryStore::new();
        store.set("borderColor-b1", "{not json".into()).expect("set");
        store.set("columnAlignments-b1", r#"{"1":"justify"}"#.into()).expect("set");
        store.set("column-widths-b1", r#"{"1":"50%"}"#.into()).expect("set");
        assert_eq!(store.border(&block()), None);
        assert_eq!(store.alignments(&block()), None);
        assert_eq!(store.widths(&block()), None);
    }

    #[test]
    fn all_left_alignments_delete_the_record() {
        let mut store = MemoryStore::new();
        let mut alignments = AlignmentRecord::new();
        alignments.insert(idx(1), Alignment::Left);
        alignments.insert(idx(2), Alignment::Center);
        store.save_alignments(&block(), &alignments).expect("save");
        assert_eq!(
            store.get("columnAlignments-b1").as_deref(),
            Some(r#"{"2":"center"}"#)
        );

        alignments.insert(idx(2), Alignment::Left);
        store.save_alignments(&block(), &alignments).expect("save");
        assert!(!store.contains("columnAlignments-b1"));
    }

    #[test]
    fn clearing_styles_keeps_widths_and_other_blocks() {
        let mut store = MemoryStore::new();
        let other = BlockId::new("b2").expect("valid id");
        for dimension in StyleDimension::ALL {
            store.save_record(dimension, &block(), &"x").expect("save");
            store.save_record(dimension, &other, &"x").expect("save");
        }
        store.clear_block_styles(&block()).expect("clear");

        let remaining: Vec<_> = store
            .keys()
            .into_iter()
            .filter(|k| k.ends_with("-b1"))
            .collect();
        assert_eq!(remaining, vec!["column-widths-b1".to_string()]);
        assert_eq!(store.keys().iter().filter(|k| k.ends_with("-b2")).count(), 6);
    }
}
