#![forbid(unsafe_code)]

//! Persistence and resolution of per-block style overrides.
//!
//! # Role in mcol
//! `mcol-store` owns everything that survives a re-render: the namespaced
//! key-value [`StyleStore`], the typed override records written by drags and
//! customization sessions, and the [`StyleResolver`] that layers those
//! records over [`GlobalSettings`](mcol_style::GlobalSettings).
//!
//! # How it fits in the system
//! The layout crate reads resolved styles when it builds a block and writes
//! records when a drag or a session commits. Blocks share nothing but the
//! store, which is partitioned by block id.

pub mod records;
pub mod resolve;
pub mod store;

pub use records::{
    AlignmentRecord, BorderRecord, ColorRecord, OverrideRecords, ResizerRecord, StyleDimension,
    ToggleColor, WidthRecord,
};
pub use resolve::{BlockOverrides, StyleResolver};
pub use store::{
    FileStore, MemoryStore, NAMESPACE, Namespaced, StorageError, StorageResult, StyleStore,
};
