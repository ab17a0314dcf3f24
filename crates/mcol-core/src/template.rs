#![forbid(unsafe_code)]

//! Source text for newly inserted column blocks.

use crate::block::{BlockId, COLUMN_SEPARATOR};

/// Code-fence language that marks a columns fragment.
pub const FENCE_LANGUAGE: &str = "columns";

/// Skeleton of a new columns fragment with a freshly minted id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    id: BlockId,
    column_count: usize,
}

impl BlockTemplate {
    /// Template with `column_count` placeholder columns and a random id.
    #[must_use]
    pub fn new(column_count: usize) -> Self {
        Self::with_id(BlockId::generate(), column_count)
    }

    /// Template with an explicit id.
    #[must_use]
    pub fn with_id(id: BlockId, column_count: usize) -> Self {
        Self { id, column_count }
    }

    /// The id embedded in the metadata section.
    #[must_use]
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Render the fenced fragment, ready to insert at the cursor.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("```{FENCE_LANGUAGE}\nid: {}\n{COLUMN_SEPARATOR}\n", self.id);
        for i in 1..=self.column_count {
            out.push_str(&format!("Column {i}\n\n"));
            if i < self.column_count {
                out.push_str(COLUMN_SEPARATOR);
                out.push('\n');
            }
        }
        out.push_str("```\n");
        out
    }
}

/// Insert commands exposed through the host's palette and editor menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnCommand {
    TwoColumns,
    ThreeColumns,
    FourColumns,
}

impl ColumnCommand {
    /// All commands in menu order.
    pub const ALL: [Self; 3] = [Self::TwoColumns, Self::ThreeColumns, Self::FourColumns];

    /// Stable command id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::TwoColumns => "two-columns",
            Self::ThreeColumns => "three-columns",
            Self::FourColumns => "four-columns",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TwoColumns => "Add 2 columns",
            Self::ThreeColumns => "Add 3 columns",
            Self::FourColumns => "Add 4 columns",
        }
    }

    #[must_use]
    pub const fn column_count(self) -> usize {
        match self {
            Self::TwoColumns => 2,
            Self::ThreeColumns => 3,
            Self::FourColumns => 4,
        }
    }

    /// Template the command inserts.
    #[must_use]
    pub fn template(self) -> BlockTemplate {
        BlockTemplate::new(self.column_count())
    }
}
