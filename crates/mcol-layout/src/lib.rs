#![forbid(unsafe_code)]

//! Live column layouts: rendering, drag resizing, and customization.
//!
//! # Role in mcol
//! `mcol-layout` is where resolved styles meet a live document. It builds the
//! element tree of a block through the [`RenderSurface`] adapter, drives one
//! [`ResizeController`] per resizer, and runs [`CustomizationSession`]s that
//! re-apply committed styles without a full re-render.
//!
//! # Key components
//! - [`ColumnLayoutRenderer`]: parse, resolve, build, and await content.
//! - [`ResizeController`]: the `Idle`/`Dragging` pointer machine.
//! - [`CustomizationSession`]: draft editing with commit-on-close.
//! - [`StyleApplier`]: the only writer of style values onto elements.
//! - [`MemorySurface`]: an in-memory surface for hosts without a DOM.

pub mod apply;
pub mod renderer;
pub mod resize;
pub mod session;
pub mod surface;

pub use apply::{ApplyStrategy, StyleApplier, hover_rule_css, hover_rule_id};
pub use renderer::{
    ColumnLayout, ColumnLayoutRenderer, ContentError, ContentRenderer, LayoutHandles,
    PlainTextRenderer, RenderContext, RenderError, RenderRequest,
};
pub use resize::{
    MIN_COLUMN_WIDTH, ResizeController, ResizeEffect, ResizeNoopReason, ResizeState,
    ResizeTargets, ResizeTransition,
};
pub use session::{ColumnOutOfRange, CommitReport, CustomizationSession};
pub use surface::{MemoryElement, MemorySurface, RenderSurface};
