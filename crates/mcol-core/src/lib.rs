#![forbid(unsafe_code)]

//! Core: fragment parsing, identifiers, and pointer events.
//!
//! # Role in mcol
//! `mcol-core` is the input layer. It turns the raw text of a `columns`
//! fragment into a [`Block`] with ordered [`Column`]s, mints identifiers for
//! new fragments, and defines the host-neutral pointer events that drive
//! column resizing.
//!
//! # How it fits in the system
//! `mcol-store` keys persisted overrides by [`BlockId`] and [`ColumnIndex`],
//! and `mcol-layout` consumes [`Block`] values and [`PointerEvent`]s to build
//! and drive the live column row.

pub mod block;
pub mod element;
pub mod event;
pub mod template;

pub use block::{Block, BlockId, COLUMN_SEPARATOR, Column, ColumnIndex, ParseError, parse};
pub use element::ElementId;
pub use event::{PointerButton, PointerEvent, PointerEventKind};
pub use template::{BlockTemplate, ColumnCommand, FENCE_LANGUAGE};
