#![forbid(unsafe_code)]

//! mcol public facade crate.
//!
//! This crate ties the layers together behind one [`ColumnsPlugin`]: it owns
//! the global settings and their file, the namespaced style store, and the
//! renderer, and exposes the operations a host wires to its events. The
//! [`prelude`] re-exports the types day-to-day integrations touch.
//!
//! ```no_run
//! use mcol::prelude::*;
//!
//! # async fn demo() -> mcol::Result<()> {
//! let plugin = ColumnsPlugin::load("settings.json", MemoryStore::new())?;
//! let mut surface = MemorySurface::new();
//! let host = surface.create_host(400.0);
//! plugin.apply_global_styles(&mut surface);
//! let layout = plugin
//!     .render_block(&mut surface, host, "id: b1\n===\nA\n===\nB", RenderContext::default(), &PlainTextRenderer)
//!     .await?;
//! assert_eq!(layout.columns().len(), 2);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

// --- Re-exports -----------------------------------------------------------

pub use mcol_core::{
    Block, BlockId, BlockTemplate, Column, ColumnCommand, ColumnIndex, ElementId, ParseError,
    PointerButton, PointerEvent, PointerEventKind,
};
pub use mcol_layout::{
    ApplyStrategy, ColumnLayout, ColumnLayoutRenderer, ColumnOutOfRange, CommitReport,
    ContentError, ContentRenderer, CustomizationSession, MemorySurface, PlainTextRenderer,
    RenderContext, RenderError, RenderRequest, RenderSurface, ResizeEffect, ResizeTransition,
};
pub use mcol_store::{
    FileStore, MemoryStore, Namespaced, OverrideRecords, StorageError, StyleDimension,
    StyleStore,
};
pub use mcol_style::{Alignment, ColumnWidth, GlobalSettings, SettingsError, color};

pub use mcol_core as core;
pub use mcol_layout as layout;
pub use mcol_store as store;
pub use mcol_style as style;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for mcol hosts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Column(#[from] ColumnOutOfRange),
}

/// Standard result type for mcol APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Plugin ---------------------------------------------------------------

/// One host integration: settings, storage, and rendering for every block
/// in the open documents.
#[derive(Debug)]
pub struct ColumnsPlugin<St: StyleStore> {
    settings: GlobalSettings,
    settings_path: Option<PathBuf>,
    store: Namespaced<St>,
    renderer: ColumnLayoutRenderer,
}

impl<St: StyleStore> ColumnsPlugin<St> {
    /// Load settings from `settings_path` (missing file means defaults) and
    /// wrap `store` in the plugin namespace.
    pub fn load(settings_path: impl Into<PathBuf>, store: St) -> Result<Self> {
        let settings_path = settings_path.into();
        let settings = GlobalSettings::from_json_file(&settings_path)?;
        tracing::debug!(
            target: "mcol.plugin",
            path = %settings_path.display(),
            "settings loaded"
        );
        Ok(Self {
            settings,
            settings_path: Some(settings_path),
            store: Namespaced::new(store),
            renderer: ColumnLayoutRenderer::default(),
        })
    }

    /// A plugin whose settings live only in memory.
    #[must_use]
    pub fn ephemeral(settings: GlobalSettings, store: St) -> Self {
        Self {
            settings: settings.normalized(),
            settings_path: None,
            store: Namespaced::new(store),
            renderer: ColumnLayoutRenderer::default(),
        }
    }

    /// Switch how styles reach elements in later renders.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ApplyStrategy) -> Self {
        self.renderer = ColumnLayoutRenderer::new(strategy);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    #[must_use]
    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    #[must_use]
    pub fn store(&self) -> &Namespaced<St> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Namespaced<St> {
        &mut self.store
    }

    /// Mutate the settings, then persist them and re-apply the root
    /// variables.
    pub fn update_settings<S, F>(&mut self, surface: &mut S, edit: F) -> Result<()>
    where
        S: RenderSurface + ?Sized,
        F: FnOnce(&mut GlobalSettings),
    {
        edit(&mut self.settings);
        self.settings = std::mem::take(&mut self.settings).normalized();
        self.persist_settings()?;
        self.apply_global_styles(surface);
        Ok(())
    }

    /// Replace the settings with the defaults, persist, and re-apply.
    pub fn reset_settings<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        self.update_settings(surface, |settings| *settings = GlobalSettings::default())
    }

    /// Write the settings-derived custom properties onto the surface root.
    pub fn apply_global_styles<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        for (name, value) in self.settings.css_variables() {
            surface.set_root_property(name, &value);
        }
    }

    /// Remove every key in the plugin namespace.
    pub fn clear_storage(&mut self) -> Result<usize> {
        let removed = self.store.clear()?;
        tracing::info!(target: "mcol.plugin", removed, "plugin storage cleared");
        Ok(removed)
    }

    /// Render one fragment into `host`.
    pub async fn render_block<S, R>(
        &self,
        surface: &mut S,
        host: ElementId,
        raw: &str,
        context: RenderContext<'_>,
        content: &R,
    ) -> Result<ColumnLayout>
    where
        S: RenderSurface,
        R: ContentRenderer + ?Sized,
    {
        let layout = self
            .renderer
            .render(surface, host, raw, context, &self.settings, &self.store, content)
            .await?;
        Ok(layout)
    }

    /// Route a document pointer event to `layout`.
    pub fn handle_pointer_event<S: RenderSurface + ?Sized>(
        &mut self,
        layout: &mut ColumnLayout,
        event: &PointerEvent,
        surface: &mut S,
    ) -> Result<Option<ResizeTransition>> {
        Ok(layout.handle_pointer_event(event, surface, &mut self.store)?)
    }

    /// Start customizing a rendered block.
    #[must_use]
    pub fn open_session(&self, layout: &ColumnLayout) -> CustomizationSession {
        layout.open_session(&self.settings, &self.store)
    }

    /// Reset a session's block to the defaults.
    pub fn reset_session<S: RenderSurface + ?Sized>(
        &mut self,
        session: &mut CustomizationSession,
        surface: &mut S,
    ) -> Result<()> {
        session.reset(surface, &mut self.store, &self.settings)?;
        Ok(())
    }

    /// Commit a session's draft.
    pub fn close_session<S: RenderSurface + ?Sized>(
        &mut self,
        session: CustomizationSession,
        surface: &mut S,
    ) -> Result<CommitReport> {
        Ok(session.close(surface, &mut self.store)?)
    }

    /// Insert commands in menu order.
    #[must_use]
    pub const fn commands(&self) -> [ColumnCommand; 3] {
        ColumnCommand::ALL
    }

    /// Fresh fragment text for `command`.
    #[must_use]
    pub fn new_block(&self, command: ColumnCommand) -> BlockTemplate {
        let template = command.template();
        tracing::debug!(
            target: "mcol.plugin",
            command = command.id(),
            block_id = %template.id(),
            "new columns block"
        );
        template
    }

    fn persist_settings(&self) -> Result<()> {
        if let Some(path) = &self.settings_path {
            self.settings.save_json_file(path)?;
        }
        Ok(())
    }
}

// --- Logging --------------------------------------------------------------

/// Environment variable holding the log filter directives.
#[cfg(feature = "logging")]
pub const LOG_ENV: &str = "MCOL_LOG";

/// Install a formatting subscriber filtered by `MCOL_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already set.
#[cfg(feature = "logging")]
pub fn init_logging() -> bool {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok()
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Alignment, ApplyStrategy, BlockId, ColumnCommand, ColumnIndex, ColumnLayout,
        ColumnWidth, ColumnsPlugin, ContentRenderer, CustomizationSession, ElementId, Error,
        FileStore, GlobalSettings, MemoryStore, MemorySurface, PlainTextRenderer, PointerButton,
        PointerEvent, PointerEventKind, RenderContext, RenderSurface, Result, StyleStore,
    };

    pub use crate::{core, layout, store, style};
}
