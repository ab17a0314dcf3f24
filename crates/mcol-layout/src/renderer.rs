#![forbid(unsafe_code)]

//! Building the live column row of one block.
//!
//! [`ColumnLayoutRenderer::render`] parses the fragment, resolves every
//! column's style, builds the container/column/resizer elements, awaits the
//! content renderer once per column in order, and only then attaches the
//! container to the host. A parse or content failure leaves nothing behind.
//!
//! ```text
//! host
//! ├── div.markdown-columns-resizable#<block id>
//! │   ├── div.column.column-style.text-left[data-index=1]
//! │   ├── div.column-resizer
//! │   └── div.column.column-style.text-left[data-index=2]
//! └── div.customise-columns-button      (live preview only)
//! ```

use async_trait::async_trait;
use mcol_core::{Block, BlockId, ElementId, ParseError, PointerEvent};
use mcol_store::{StorageError, StorageResult, StyleResolver, StyleStore};
use mcol_style::{GlobalSettings, StyleSource};
use tracing::Instrument;

use crate::apply::{
    ApplyStrategy, COLUMN_CLASS, COLUMN_STYLE_CLASS, CONTAINER_CLASS, RESIZER_CLASS, StyleApplier,
    hover_rule_id, sync_hover_rule,
};
use crate::resize::{ResizeController, ResizeTargets, ResizeTransition};
use crate::session::CustomizationSession;
use crate::surface::RenderSurface;

/// Class of the customize affordance.
pub const CUSTOMIZE_BUTTON_CLASS: &str = "customise-columns-button";
/// Accessible label of the customize affordance.
pub const CUSTOMIZE_BUTTON_LABEL: &str = "Customise this block";

/// A content renderer rejected a column payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("content renderer failed: {message}")]
pub struct ContentError {
    message: String,
}

impl ContentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that abort a block render or a layout operation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One column payload handed to a [`ContentRenderer`].
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Trimmed column payload.
    pub content: &'a str,
    /// Column element to render into.
    pub target: ElementId,
    /// Path of the document that holds the fragment.
    pub source_path: &'a str,
    /// Block that owns the column.
    pub owner: &'a BlockId,
}

/// Turns a column's text payload into display markup.
#[async_trait(?Send)]
pub trait ContentRenderer {
    async fn render(
        &self,
        surface: &mut dyn RenderSurface,
        request: RenderRequest<'_>,
    ) -> Result<(), ContentError>;
}

/// Renders payloads verbatim as element text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

#[async_trait(?Send)]
impl ContentRenderer for PlainTextRenderer {
    async fn render(
        &self,
        surface: &mut dyn RenderSurface,
        request: RenderRequest<'_>,
    ) -> Result<(), ContentError> {
        surface.set_text(request.target, request.content);
        Ok(())
    }
}

/// Where a fragment is being rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    /// Path of the document that holds the fragment.
    pub source_path: &'a str,
    /// Editing view with inline previews; adds the customize affordance.
    pub live_preview: bool,
}

/// Element handles a customization session applies styles to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutHandles {
    pub container: ElementId,
    pub columns: Vec<ElementId>,
    pub resizers: Vec<ElementId>,
    pub applier: StyleApplier,
}

/// Builds column layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnLayoutRenderer {
    applier: StyleApplier,
}

impl ColumnLayoutRenderer {
    #[must_use]
    pub const fn new(strategy: ApplyStrategy) -> Self {
        Self {
            applier: StyleApplier::new(strategy),
        }
    }

    #[must_use]
    pub const fn applier(&self) -> StyleApplier {
        self.applier
    }

    /// Render the fragment `raw` into `host`.
    #[allow(clippy::too_many_arguments)]
    pub async fn render<S, St, R>(
        &self,
        surface: &mut S,
        host: ElementId,
        raw: &str,
        context: RenderContext<'_>,
        settings: &GlobalSettings,
        store: &St,
        content: &R,
    ) -> Result<ColumnLayout, RenderError>
    where
        S: RenderSurface,
        St: StyleStore + ?Sized,
        R: ContentRenderer + ?Sized,
    {
        let block = match Block::parse(raw) {
            Ok(block) => block,
            Err(err) => {
                tracing::warn!(target: "mcol.render", error = %err, "columns block rejected");
                return Err(err.into());
            }
        };
        let span = tracing::debug_span!(
            target: "mcol.render",
            "render_block",
            block_id = %block.id(),
            columns = block.column_count()
        );
        self.build(surface, host, block, context, settings, store, content)
            .instrument(span)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn build<S, St, R>(
        &self,
        surface: &mut S,
        host: ElementId,
        block: Block,
        context: RenderContext<'_>,
        settings: &GlobalSettings,
        store: &St,
        content: &R,
    ) -> Result<ColumnLayout, RenderError>
    where
        S: RenderSurface,
        St: StyleStore + ?Sized,
        R: ContentRenderer + ?Sized,
    {
        let overrides = StyleResolver::new(store).overrides(block.id());
        let chrome = overrides.container(settings);

        let container = surface.create_element("div");
        surface.add_class(container, CONTAINER_CLASS);
        surface.set_attribute(container, "id", block.id().as_str());
        if chrome.border_source == StyleSource::Override {
            self.applier
                .apply_border(surface, container, &chrome.border_color, chrome.show_border);
        }
        let resizer_override = chrome.resizer_source == StyleSource::Override;

        let count = block.column_count();
        let mut columns = Vec::with_capacity(count);
        let mut resizers = Vec::with_capacity(count.saturating_sub(1));
        for column in block.columns() {
            let element = surface.create_element("div");
            surface.add_class(element, COLUMN_CLASS);
            surface.add_class(element, COLUMN_STYLE_CLASS);
            surface.set_attribute(element, "data-index", &column.index().to_string());
            self.applier
                .apply_column(surface, element, &overrides.column(column.index()));

            let request = RenderRequest {
                content: column.content(),
                target: element,
                source_path: context.source_path,
                owner: block.id(),
            };
            if let Err(err) = content.render(&mut *surface, request).await {
                tracing::warn!(
                    target: "mcol.render",
                    block_id = %block.id(),
                    column = column.index().get(),
                    error = %err,
                    "content renderer failed"
                );
                surface.remove_element(element);
                surface.remove_element(container);
                return Err(err.into());
            }
            surface.append_child(container, element);
            columns.push(element);

            if column.index().position() + 1 < count {
                let resizer = surface.create_element("div");
                surface.add_class(resizer, RESIZER_CLASS);
                if resizer_override {
                    self.applier.apply_resizer(
                        surface,
                        resizer,
                        &chrome.resizer_color,
                        chrome.show_resizer,
                    );
                }
                surface.append_child(container, resizer);
                resizers.push(resizer);
            }
        }
        sync_hover_rule(
            surface,
            block.id(),
            resizer_override.then_some(chrome.resizer_color.as_str()),
        );

        surface.append_child(host, container);
        let customize_button = context.live_preview.then(|| {
            let button = surface.create_element("div");
            surface.add_class(button, CUSTOMIZE_BUTTON_CLASS);
            surface.set_attribute(button, "aria-label", CUSTOMIZE_BUTTON_LABEL);
            surface.append_child(host, button);
            button
        });

        let controllers = resizers
            .iter()
            .enumerate()
            .map(|(i, resizer)| {
                ResizeController::new(
                    block.id().clone(),
                    ResizeTargets {
                        container,
                        resizer: *resizer,
                        prev: columns[i],
                        next: columns[i + 1],
                    },
                    columns.clone(),
                    self.applier,
                )
            })
            .collect();

        tracing::debug!(
            target: "mcol.render",
            block_id = %block.id(),
            columns = columns.len(),
            customizable = customize_button.is_some(),
            "block rendered"
        );

        Ok(ColumnLayout {
            block,
            container,
            columns,
            resizers,
            controllers,
            customize_button,
            applier: self.applier,
        })
    }
}

/// A rendered block and the controllers attached to it.
#[derive(Debug)]
pub struct ColumnLayout {
    block: Block,
    container: ElementId,
    columns: Vec<ElementId>,
    resizers: Vec<ElementId>,
    controllers: Vec<ResizeController>,
    customize_button: Option<ElementId>,
    applier: StyleApplier,
}

impl ColumnLayout {
    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }

    #[must_use]
    pub fn block_id(&self) -> &BlockId {
        self.block.id()
    }

    #[must_use]
    pub const fn container(&self) -> ElementId {
        self.container
    }

    /// Column elements in order.
    #[must_use]
    pub fn columns(&self) -> &[ElementId] {
        &self.columns
    }

    /// Resizer elements in order; resizer `i` sits between columns `i` and
    /// `i + 1` (zero-based).
    #[must_use]
    pub fn resizers(&self) -> &[ElementId] {
        &self.resizers
    }

    #[must_use]
    pub fn controllers(&self) -> &[ResizeController] {
        &self.controllers
    }

    /// The customize affordance, present in live-preview renders.
    #[must_use]
    pub const fn customize_button(&self) -> Option<ElementId> {
        self.customize_button
    }

    /// Whether any resizer of this block is mid-drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.controllers.iter().any(ResizeController::is_dragging)
    }

    /// Handles for applying styles to this block without re-rendering.
    #[must_use]
    pub fn handles(&self) -> LayoutHandles {
        LayoutHandles {
            container: self.container,
            columns: self.columns.clone(),
            resizers: self.resizers.clone(),
            applier: self.applier,
        }
    }

    /// Route a document pointer event to this block's resizers.
    ///
    /// Returns the transition of the controller that acted, if any.
    pub fn handle_pointer_event<S, St>(
        &mut self,
        event: &PointerEvent,
        surface: &mut S,
        store: &mut St,
    ) -> StorageResult<Option<ResizeTransition>>
    where
        S: RenderSurface + ?Sized,
        St: StyleStore + ?Sized,
    {
        let mut acted = None;
        for controller in &mut self.controllers {
            let transition = controller.handle_event(event, surface, store)?;
            if !transition.is_noop() {
                acted = Some(transition);
            }
        }
        Ok(acted)
    }

    /// Start a customization session for this block.
    pub fn open_session<St: StyleStore + ?Sized>(
        &self,
        settings: &GlobalSettings,
        store: &St,
    ) -> CustomizationSession {
        CustomizationSession::open(
            self.block_id().clone(),
            self.block.column_count(),
            Some(self.handles()),
            settings,
            store,
        )
    }

    /// Tear the block down: drop its hover rule and abandon any drag.
    pub fn unmount<S: RenderSurface + ?Sized>(mut self, surface: &mut S) {
        for controller in &mut self.controllers {
            controller.force_cancel(surface);
        }
        surface.remove_style_rule(&hover_rule_id(self.block.id()));
        tracing::debug!(target: "mcol.render", block_id = %self.block.id(), "block unmounted");
    }
}
