//! Configuration for gesture handling and persistence timing
//!
//! Hosts pick a preset profile or provide custom options; both resolve to a
//! single [`InteractionOptions`] value consumed by the gesture controller.

use crate::core::constants::{
    DEFAULT_ZOOM, DRAG_PAN_THRESHOLD, MAX_ZOOM, MIN_ZOOM, PERSIST_DEBOUNCE_MS,
    ZOOM_STEP_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum InteractionProfile {
    /// Mouse and trackpad input
    #[default]
    Desktop,
    /// Finger input: coarser drags, quicker saves
    Touch,
    Custom(InteractionOptions),
}

impl InteractionProfile {
    pub fn resolve(&self) -> InteractionOptions {
        match self {
            Self::Desktop => InteractionOptions::default(),
            Self::Touch => InteractionOptions {
                drag_pan_threshold: 96.0,
                persist_debounce_ms: 300,
                keyboard: false,
                ..InteractionOptions::default()
            },
            Self::Custom(options) => options.clone().sanitized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionOptions {
    /// Accumulated drag distance in pixels that pans one tile
    pub drag_pan_threshold: f64,
    /// Minimum scroll delta for one zoom step
    pub zoom_step_threshold: f64,
    /// Quiet period before the viewport is persisted
    pub persist_debounce_ms: u64,
    /// Zoom used when centering on nodes
    pub default_zoom: u8,
    /// Nudge the viewport toward the cursor on scroll zoom-in
    pub zoom_to_cursor: bool,
    /// Arrow keys and +/- navigate the map
    pub keyboard: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            drag_pan_threshold: DRAG_PAN_THRESHOLD,
            zoom_step_threshold: ZOOM_STEP_THRESHOLD,
            persist_debounce_ms: PERSIST_DEBOUNCE_MS,
            default_zoom: DEFAULT_ZOOM,
            zoom_to_cursor: true,
            keyboard: true,
        }
    }
}

impl InteractionOptions {
    /// Replaces unusable thresholds with defaults and clamps the zoom
    pub fn sanitized(mut self) -> Self {
        if !(self.drag_pan_threshold.is_finite() && self.drag_pan_threshold > 0.0) {
            self.drag_pan_threshold = DRAG_PAN_THRESHOLD;
        }
        if !(self.zoom_step_threshold.is_finite() && self.zoom_step_threshold > 0.0) {
            self.zoom_step_threshold = ZOOM_STEP_THRESHOLD;
        }
        self.default_zoom = self.default_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}
