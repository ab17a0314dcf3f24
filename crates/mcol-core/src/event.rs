#![forbid(unsafe_code)]

//! Canonical pointer events.
//!
//! Hosts translate their native pointer/mouse events into [`PointerEvent`]
//! values. Coordinates are layout pixels in the document's coordinate space;
//! only the horizontal coordinate matters for column resizing.

use crate::element::ElementId;

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// Horizontal position in layout pixels.
    pub x: f64,

    /// Vertical position in layout pixels.
    pub y: f64,

    /// Element under the pointer, when the host resolved one.
    ///
    /// Document-scoped moves and releases usually carry no target.
    pub target: Option<ElementId>,
}

impl PointerEvent {
    /// Create a new pointer event without a target.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            target: None,
        }
    }

    /// Primary-button press over `target`.
    #[must_use]
    pub const fn down(target: ElementId, x: f64) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), x, 0.0).with_target(target)
    }

    /// Pointer moved to `x`.
    #[must_use]
    pub const fn moved(x: f64) -> Self {
        Self::new(PointerEventKind::Moved, x, 0.0)
    }

    /// Primary-button release at `x`.
    #[must_use]
    pub const fn up(x: f64) -> Self {
        Self::new(PointerEventKind::Up(PointerButton::Primary), x, 0.0)
    }

    /// Attach the element under the pointer.
    #[must_use]
    pub const fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved, with or without a button held.
    Moved,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button.
    Middle,
}
