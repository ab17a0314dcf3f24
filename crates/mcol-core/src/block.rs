#![forbid(unsafe_code)]

//! Fragment payload parsing.
//!
//! A `columns` fragment is plain UTF-8 text. The first section holds metadata
//! and must carry an `id:` line; every following section is one column's
//! payload. Sections are separated by lines that are exactly `===`.
//!
//! ```text
//! id: b1
//! ===
//! Hello
//! ===
//! World
//! ```
//!
//! parses into block `b1` with columns `["Hello", "World"]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whole-line delimiter between the metadata section and each column payload.
pub const COLUMN_SEPARATOR: &str = "===";

const ID_KEY: &str = "id:";

/// Errors produced while parsing a fragment payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The metadata section has no `id:` line, or its value is blank.
    #[error("no 'id' found in columns block metadata")]
    MissingId,
}

/// Stable, user-supplied identifier of one column block.
///
/// Identifiers are embedded verbatim in storage keys, so they are trimmed and
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId(String);

impl BlockId {
    /// Build an identifier from raw metadata text.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ParseError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ParseError::MissingId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Mint a fresh random identifier (UUID v4, 122 random bits).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BlockId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

/// Rejected zero column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("column indices are 1-based (got 0)")]
pub struct ZeroColumnIndex;

/// 1-based position of a column within its block.
///
/// This is the key of every per-column override map. In JSON it is written as
/// a numeric string (`"1"`, `"2"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ColumnIndex(u32);

impl ColumnIndex {
    /// The first column.
    pub const FIRST: Self = Self(1);

    /// Create an index from its 1-based value.
    pub fn new(raw: u32) -> Result<Self, ZeroColumnIndex> {
        if raw == 0 {
            return Err(ZeroColumnIndex);
        }
        Ok(Self(raw))
    }

    /// Index of the column stored at zero-based `position`.
    #[must_use]
    pub fn from_position(position: usize) -> Self {
        Self(u32::try_from(position).map_or(u32::MAX, |p| p.saturating_add(1)))
    }

    /// The 1-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position, used for positional records such as widths.
    #[must_use]
    pub const fn position(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Iterate `1..=count`.
    pub fn range(count: usize) -> impl Iterator<Item = Self> {
        (0..count).map(Self::from_position)
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ColumnIndex {
    type Error = ZeroColumnIndex;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnIndex> for u32 {
    fn from(index: ColumnIndex) -> Self {
        index.0
    }
}

/// One slot of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    index: ColumnIndex,
    content: String,
}

impl Column {
    /// The column's 1-based index.
    #[must_use]
    pub const fn index(&self) -> ColumnIndex {
        self.index
    }

    /// Trimmed payload handed to the content renderer.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// One parsed column fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    columns: Vec<Column>,
}

impl Block {
    /// Parse a raw fragment payload.
    ///
    /// A payload without separators is a valid block with zero columns.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut sections = split_sections(raw).into_iter();
        let metadata = sections.next().unwrap_or_default();
        let id = metadata_id(&metadata)?;

        let columns = sections
            .enumerate()
            .map(|(position, payload)| Column {
                index: ColumnIndex::from_position(position),
                content: payload.trim().to_string(),
            })
            .collect::<Vec<_>>();

        tracing::trace!(
            target: "mcol.parse",
            block_id = %id,
            columns = columns.len(),
            "parsed columns block"
        );

        Ok(Self { id, columns })
    }

    /// The block identifier.
    #[must_use]
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Columns in document order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by its 1-based index.
    #[must_use]
    pub fn column(&self, index: ColumnIndex) -> Option<&Column> {
        self.columns.get(index.position())
    }
}

/// Parse a raw fragment payload. See [`Block::parse`].
pub fn parse(raw: &str) -> Result<Block, ParseError> {
    Block::parse(raw)
}

fn split_sections(raw: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    for line in raw.lines() {
        if line == COLUMN_SEPARATOR {
            sections.push(String::new());
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    sections
}

fn metadata_id(metadata: &str) -> Result<BlockId, ParseError> {
    metadata
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(ID_KEY))
        .ok_or(ParseError::MissingId)
        .and_then(|value| BlockId::new(value))
}
