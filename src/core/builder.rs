//! Map view builder for fluent API configuration
//!
//! This module provides a MapViewBuilder that wires the interaction profile,
//! the persisted-viewport store and the persist callback into a [`MapView`].

use crate::{
    core::{
        config::{InteractionOptions, InteractionProfile},
        geo::CanvasSize,
        map::{centered_viewport, MapView},
        viewport::ViewportState,
    },
    data::store::{PersistedViewport, ViewportStore},
    input::GestureController,
    nodes::registry::NodeRegistry,
};
use std::sync::Arc;

type PersistFn = Arc<dyn Fn(ViewportState) + Send + Sync>;

/// Builder for creating and configuring MapView instances
#[derive(Default)]
pub struct MapViewBuilder {
    profile: InteractionProfile,
    store: Option<Arc<dyn ViewportStore>>,
    on_persist: Option<PersistFn>,
    canvas: Option<CanvasSize>,
}

impl MapViewBuilder {
    /// Create a new MapViewBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interaction profile
    pub fn with_profile(mut self, profile: InteractionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set custom interaction options
    pub fn with_options(mut self, options: InteractionOptions) -> Self {
        self.profile = InteractionProfile::Custom(options);
        self
    }

    /// Restore the viewport from, and persist it to, `store`
    pub fn with_store(mut self, store: Arc<dyn ViewportStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the initial canvas size used for zoom-to-cursor
    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = Some(canvas);
        self
    }

    /// Called with the settled viewport after each burst of input
    pub fn on_persist<F>(mut self, callback: F) -> Self
    where
        F: Fn(ViewportState) + Send + Sync + 'static,
    {
        self.on_persist = Some(Arc::new(callback));
        self
    }

    fn restored_viewport(&self) -> Option<ViewportState> {
        let store = self.store.as_ref()?;
        match store.load() {
            Ok(stored) => stored.and_then(|stored| stored.viewport()),
            Err(e) => {
                log::warn!("failed to load saved viewport, centering on nodes instead: {}", e);
                None
            }
        }
    }

    /// Build the view, restoring saved state or centering on `registry`'s nodes
    pub fn build(self, registry: &dyn NodeRegistry) -> MapView {
        let options = self.profile.resolve();

        let (viewport, auto_center) = match self.restored_viewport() {
            Some(viewport) => {
                log::info!(
                    "restored viewport z{} ({}, {}); auto-centering disabled",
                    viewport.zoom,
                    viewport.tile_x,
                    viewport.tile_y
                );
                (viewport, false)
            }
            None => match centered_viewport(registry, options.default_zoom) {
                Some(viewport) => {
                    log::info!(
                        "centered on nodes at z{} ({}, {})",
                        viewport.zoom,
                        viewport.tile_x,
                        viewport.tile_y
                    );
                    (viewport, true)
                }
                None => {
                    log::info!("no node positions yet; showing the whole world");
                    (ViewportState::default(), true)
                }
            },
        };

        let mut gestures = GestureController::new(viewport, options);
        if let Some(canvas) = self.canvas {
            gestures.set_canvas_size(canvas);
        }

        let store = self.store;
        let user = self.on_persist;
        if store.is_some() || user.is_some() {
            gestures.on_persist(move |state| {
                if let Some(store) = &store {
                    if let Err(e) = store.save(&PersistedViewport::from_viewport(state)) {
                        log::warn!("failed to persist viewport: {}", e);
                    }
                }
                if let Some(user) = &user {
                    user(state);
                }
            });
        }

        MapView::new(gestures, auto_center)
    }
}
