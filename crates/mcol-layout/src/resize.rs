#![forbid(unsafe_code)]

//! Drag resizing of two adjacent columns.
//!
//! One [`ResizeController`] is bound to each resizer. It is a small
//! deterministic state machine:
//!
//! ```text
//! Idle --down on resizer--> Dragging --up anywhere--> Idle (commit)
//!                               |
//!                               +--move--> Dragging (live widths)
//! ```
//!
//! Moves and releases are document-scoped: every controller of a layout sees
//! them, and only the one that is dragging acts. A move that would leave
//! either column narrower than [`MIN_COLUMN_WIDTH`] is rejected for both.
//!
//! On release the controller reads the width of *every* column of the block
//! and writes the full positional width record, so the record always has one
//! entry per column.

use mcol_core::{BlockId, ElementId, PointerButton, PointerEvent, PointerEventKind};
use mcol_store::{OverrideRecords, StorageResult, StyleDimension, StyleStore, WidthRecord};
use mcol_style::ColumnWidth;
use serde::Serialize;

use crate::apply::{CURSOR_CLASS, StyleApplier};
use crate::surface::RenderSurface;

/// Narrowest width, in layout pixels, a drag may leave either column at.
pub const MIN_COLUMN_WIDTH: f64 = 50.0;

/// Drag lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResizeState {
    Idle,
    Dragging {
        start_x: f64,
        start_prev_width: f64,
        start_next_width: f64,
    },
}

/// Why an event left the machine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    TargetMismatch,
    UnsupportedButton,
    BelowMinimumWidth,
    ZeroContainerWidth,
}

/// Effect of one lifecycle step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ResizeEffect {
    DragStarted {
        start_x: f64,
        prev_width: f64,
        next_width: f64,
    },
    DragUpdated {
        delta_x: f64,
        prev: ColumnWidth,
        next: ColumnWidth,
    },
    Committed {
        widths: WidthRecord,
    },
    Canceled,
    Noop {
        reason: ResizeNoopReason,
    },
}

/// One state-machine transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResizeTransition {
    pub transition_id: u64,
    pub from: ResizeState,
    pub to: ResizeState,
    pub effect: ResizeEffect,
}

impl ResizeTransition {
    /// Whether the event was ignored.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self.effect, ResizeEffect::Noop { .. })
    }
}

/// Elements a controller operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTargets {
    pub container: ElementId,
    pub resizer: ElementId,
    /// Column left of the resizer.
    pub prev: ElementId,
    /// Column right of the resizer.
    pub next: ElementId,
}

/// Drag machine of one resizer.
#[derive(Debug, Clone)]
pub struct ResizeController {
    block: BlockId,
    targets: ResizeTargets,
    columns: Vec<ElementId>,
    applier: StyleApplier,
    state: ResizeState,
    transition_counter: u64,
}

impl ResizeController {
    /// Bind a controller to one resizer. `columns` lists every column of the
    /// block in order and is read back on commit.
    #[must_use]
    pub fn new(
        block: BlockId,
        targets: ResizeTargets,
        columns: Vec<ElementId>,
        applier: StyleApplier,
    ) -> Self {
        Self {
            block,
            targets,
            columns,
            applier,
            state: ResizeState::Idle,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ResizeState {
        self.state
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, ResizeState::Dragging { .. })
    }

    #[must_use]
    pub const fn targets(&self) -> ResizeTargets {
        self.targets
    }

    #[must_use]
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    /// Feed one pointer event through the machine.
    ///
    /// Only a commit touches the store; its write error is returned after the
    /// machine has already returned to `Idle`.
    pub fn handle_event<S, St>(
        &mut self,
        event: &PointerEvent,
        surface: &mut S,
        store: &mut St,
    ) -> StorageResult<ResizeTransition>
    where
        S: RenderSurface + ?Sized,
        St: StyleStore + ?Sized,
    {
        let from = self.state;
        let effect = match (self.state, event.kind) {
            (ResizeState::Idle, PointerEventKind::Down(button)) => {
                self.begin(event, button, surface)
            }
            (ResizeState::Dragging { .. }, PointerEventKind::Down(_)) => ResizeEffect::Noop {
                reason: ResizeNoopReason::ActiveDragAlreadyInProgress,
            },
            (ResizeState::Idle, _) => ResizeEffect::Noop {
                reason: ResizeNoopReason::IdleWithoutActiveDrag,
            },
            (
                ResizeState::Dragging {
                    start_x,
                    start_prev_width,
                    start_next_width,
                },
                PointerEventKind::Moved,
            ) => self.update(
                event.x - start_x,
                start_prev_width,
                start_next_width,
                surface,
            ),
            (ResizeState::Dragging { .. }, PointerEventKind::Up(_)) => {
                self.state = ResizeState::Idle;
                surface.release_body_class(CURSOR_CLASS);
                let widths = self.commit(surface, store);
                self.transition_counter = self.transition_counter.saturating_add(1);
                let widths = widths?;
                return Ok(ResizeTransition {
                    transition_id: self.transition_counter,
                    from,
                    to: self.state,
                    effect: ResizeEffect::Committed { widths },
                });
            }
        };
        self.transition_counter = self.transition_counter.saturating_add(1);
        Ok(ResizeTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        })
    }

    /// Abandon an in-flight drag without committing.
    ///
    /// Returns `None` when the machine is already idle.
    pub fn force_cancel<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Option<ResizeTransition> {
        let from = self.state;
        if !self.is_dragging() {
            return None;
        }
        self.state = ResizeState::Idle;
        surface.release_body_class(CURSOR_CLASS);
        self.transition_counter = self.transition_counter.saturating_add(1);
        tracing::debug!(target: "mcol.resize", block_id = %self.block, "drag canceled");
        Some(ResizeTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect: ResizeEffect::Canceled,
        })
    }

    fn begin<S: RenderSurface + ?Sized>(
        &mut self,
        event: &PointerEvent,
        button: PointerButton,
        surface: &mut S,
    ) -> ResizeEffect {
        if event.target != Some(self.targets.resizer) {
            return ResizeEffect::Noop {
                reason: ResizeNoopReason::TargetMismatch,
            };
        }
        if button != PointerButton::Primary {
            return ResizeEffect::Noop {
                reason: ResizeNoopReason::UnsupportedButton,
            };
        }
        let prev_width = surface.measured_width(self.targets.prev);
        let next_width = surface.measured_width(self.targets.next);
        self.state = ResizeState::Dragging {
            start_x: event.x,
            start_prev_width: prev_width,
            start_next_width: next_width,
        };
        surface.hold_body_class(CURSOR_CLASS);
        tracing::debug!(
            target: "mcol.resize",
            block_id = %self.block,
            start_x = event.x,
            prev_width,
            next_width,
            "drag started"
        );
        ResizeEffect::DragStarted {
            start_x: event.x,
            prev_width,
            next_width,
        }
    }

    fn update<S: RenderSurface + ?Sized>(
        &self,
        delta_x: f64,
        start_prev_width: f64,
        start_next_width: f64,
        surface: &mut S,
    ) -> ResizeEffect {
        let new_prev = start_prev_width + delta_x;
        let new_next = start_next_width - delta_x;
        if new_prev < MIN_COLUMN_WIDTH || new_next < MIN_COLUMN_WIDTH {
            tracing::trace!(
                target: "mcol.resize",
                block_id = %self.block,
                new_prev,
                new_next,
                "move rejected below minimum width"
            );
            return ResizeEffect::Noop {
                reason: ResizeNoopReason::BelowMinimumWidth,
            };
        }
        let container_width = surface.measured_width(self.targets.container);
        if container_width <= 0.0 {
            return ResizeEffect::Noop {
                reason: ResizeNoopReason::ZeroContainerWidth,
            };
        }

        let (prev, next) = split_percentages(new_prev, new_next, container_width);
        self.applier.apply_width(surface, self.targets.prev, prev);
        self.applier.apply_width(surface, self.targets.next, next);
        ResizeEffect::DragUpdated { delta_x, prev, next }
    }

    fn commit<S, St>(&self, surface: &S, store: &mut St) -> StorageResult<WidthRecord>
    where
        S: RenderSurface + ?Sized,
        St: StyleStore + ?Sized,
    {
        let widths: WidthRecord = self
            .columns
            .iter()
            .map(|column| self.applier.read_width(surface, *column))
            .collect();
        store.save_record(StyleDimension::ColumnWidths, &self.block, &widths)?;
        tracing::debug!(
            target: "mcol.resize",
            block_id = %self.block,
            columns = widths.len(),
            "widths committed"
        );
        Ok(widths)
    }
}

/// Convert two pixel widths into container percentages rounded to two
/// decimals. The pair keeps the exact combined share of the two columns.
fn split_percentages(prev_px: f64, next_px: f64, container_px: f64) -> (ColumnWidth, ColumnWidth) {
    let prev = round2(prev_px / container_px * 100.0);
    let combined = round2((prev_px + next_px) / container_px * 100.0);
    (
        ColumnWidth::Percent(prev),
        ColumnWidth::Percent(round2(combined - prev)),
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use mcol_store::MemoryStore;
    use mcol_style::vars;
    use proptest::prelude::*;

    struct Fixture {
        surface: MemorySurface,
        store: MemoryStore,
        controller: ResizeController,
        columns: Vec<ElementId>,
    }

    fn fixture(widths: &[f64], pair: usize) -> Fixture {
        let mut surface = MemorySurface::new();
        let container = surface.create_host(widths.iter().sum::<f64>());
        let mut columns = Vec::new();
        let mut resizers = Vec::new();
        for (i, width) in widths.iter().enumerate() {
            let column = surface.create_element("div");
            surface.append_child(container, column);
            surface.set_measured_width(column, *width);
            surface.set_style_property(column, vars::COLUMN_WIDTH, "auto");
            columns.push(column);
            if i + 1 < widths.len() {
                let resizer = surface.create_element("div");
                surface.append_child(container, resizer);
                resizers.push(resizer);
            }
        }
        let controller = ResizeController::new(
            BlockId::new("b1").expect("valid id"),
            ResizeTargets {
                container,
                resizer: resizers[pair],
                prev: columns[pair],
                next: columns[pair + 1],
            },
            columns.clone(),
            StyleApplier::default(),
        );
        Fixture {
            surface,
            store: MemoryStore::new(),
            controller,
            columns,
        }
    }

    impl Fixture {
        fn send(&mut self, event: PointerEvent) -> ResizeTransition {
            self.controller
                .handle_event(&event, &mut self.surface, &mut self.store)
                .expect("memory store never fails")
        }

        fn resizer(&self) -> ElementId {
            self.controller.targets().resizer
        }

        fn width_style(&self, column: usize) -> Option<&str> {
            self.surface
                .element(self.columns[column])
                .and_then(|node| node.style(vars::COLUMN_WIDTH))
        }
    }

    #[test]
    fn drag_of_thirty_pixels_on_four_hundred() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        let resizer = fx.resizer();

        let started = fx.send(PointerEvent::down(resizer, 100.0));
        assert!(matches!(started.effect, ResizeEffect::DragStarted { .. }));
        assert!(fx.surface.body_has_class(CURSOR_CLASS));

        let moved = fx.send(PointerEvent::moved(130.0));
        assert_eq!(
            moved.effect,
            ResizeEffect::DragUpdated {
                delta_x: 30.0,
                prev: ColumnWidth::Percent(57.5),
                next: ColumnWidth::Percent(42.5),
            }
        );
        assert_eq!(fx.width_style(0), Some("57.50%"));
        assert_eq!(fx.width_style(1), Some("42.50%"));

        let committed = fx.send(PointerEvent::up(130.0));
        assert_eq!(committed.to, ResizeState::Idle);
        assert!(!fx.surface.body_has_class(CURSOR_CLASS));
        assert_eq!(
            fx.store.get("column-widths-b1").as_deref(),
            Some(r#"["57.50%","42.50%"]"#)
        );
    }

    #[test]
    fn move_below_minimum_is_rejected_for_both_columns() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        let resizer = fx.resizer();
        fx.send(PointerEvent::down(resizer, 0.0));
        fx.send(PointerEvent::moved(100.0));
        let rejected = fx.send(PointerEvent::moved(151.0));
        assert_eq!(
            rejected.effect,
            ResizeEffect::Noop {
                reason: ResizeNoopReason::BelowMinimumWidth
            }
        );
        assert_eq!(fx.width_style(0), Some("75.00%"));
        assert_eq!(fx.width_style(1), Some("25.00%"));

        let edge = fx.send(PointerEvent::moved(150.0));
        assert!(!edge.is_noop());
        assert_eq!(fx.width_style(1), Some("12.50%"));
    }

    #[test]
    fn commit_records_every_column() {
        let mut fx = fixture(&[100.0, 100.0, 200.0], 1);
        let resizer = fx.resizer();
        fx.send(PointerEvent::down(resizer, 0.0));
        fx.send(PointerEvent::moved(-20.0));
        let committed = fx.send(PointerEvent::up(-20.0));
        let ResizeEffect::Committed { widths } = committed.effect else {
            panic!("expected commit, got {:?}", committed.effect);
        };
        assert_eq!(
            widths,
            vec![
                ColumnWidth::Auto,
                ColumnWidth::Percent(20.0),
                ColumnWidth::Percent(55.0),
            ]
        );
        assert_eq!(
            fx.store.get("column-widths-b1").as_deref(),
            Some(r#"["auto","20.00%","55.00%"]"#)
        );
    }

    #[test]
    fn release_without_drag_writes_nothing() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        let up = fx.send(PointerEvent::up(5.0));
        assert_eq!(
            up.effect,
            ResizeEffect::Noop {
                reason: ResizeNoopReason::IdleWithoutActiveDrag
            }
        );
        assert!(fx.store.is_empty());
    }

    #[test]
    fn presses_elsewhere_do_not_arm() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        let column = fx.columns[0];
        let elsewhere = fx.send(PointerEvent::down(column, 5.0));
        assert_eq!(
            elsewhere.effect,
            ResizeEffect::Noop {
                reason: ResizeNoopReason::TargetMismatch
            }
        );

        let resizer = fx.resizer();
        let secondary = PointerEvent::new(
            PointerEventKind::Down(PointerButton::Secondary),
            5.0,
            0.0,
        )
        .with_target(resizer);
        assert_eq!(
            fx.send(secondary).effect,
            ResizeEffect::Noop {
                reason: ResizeNoopReason::UnsupportedButton
            }
        );
        assert_eq!(fx.controller.state(), ResizeState::Idle);
    }

    #[test]
    fn force_cancel_clears_cursor_without_commit() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        assert!(fx.controller.force_cancel(&mut fx.surface).is_none());
        let resizer = fx.resizer();
        fx.send(PointerEvent::down(resizer, 0.0));
        fx.send(PointerEvent::moved(10.0));
        let canceled = fx.controller.force_cancel(&mut fx.surface).expect("was dragging");
        assert_eq!(canceled.effect, ResizeEffect::Canceled);
        assert!(!fx.surface.body_has_class(CURSOR_CLASS));
        assert!(fx.store.is_empty());
    }

    #[test]
    fn transitions_serialize_with_tags() {
        let mut fx = fixture(&[200.0, 200.0], 0);
        let noop = fx.send(PointerEvent::moved(1.0));
        let json = serde_json::to_value(&noop).expect("serialize");
        assert_eq!(json["from"]["state"], "idle");
        assert_eq!(json["effect"]["effect"], "noop");
        assert_eq!(json["effect"]["reason"], "idle_without_active_drag");

        let resizer = fx.resizer();
        fx.send(PointerEvent::down(resizer, 0.0));
        let moved = fx.send(PointerEvent::moved(30.0));
        let json = serde_json::to_value(&moved).expect("serialize");
        assert_eq!(json["to"]["state"], "dragging");
        assert_eq!(json["effect"]["prev"], "57.50%");
    }

    proptest! {
        #[test]
        fn no_drag_leaves_a_column_below_minimum(
            deltas in proptest::collection::vec(-400i32..400, 1..24),
            split in 60i32..340,
        ) {
            let split = f64::from(split);
            let mut fx = fixture(&[split, 400.0 - split], 0);
            let resizer = fx.resizer();
            fx.send(PointerEvent::down(resizer, 0.0));
            for delta in deltas {
                fx.send(PointerEvent::moved(f64::from(delta)));
                let prev = fx.surface.measured_width(fx.columns[0]);
                let next = fx.surface.measured_width(fx.columns[1]);
                prop_assert!(prev >= MIN_COLUMN_WIDTH - 0.02, "prev = {prev}");
                prop_assert!(next >= MIN_COLUMN_WIDTH - 0.02, "next = {next}");
            }
            let committed = fx.send(PointerEvent::up(0.0));
            let committed_widths = match &committed.effect {
                ResizeEffect::Committed { widths } => widths.len(),
                _ => 0,
            };
            prop_assert_eq!(committed_widths, 2, "release commits one width per column");
        }
    }
}
