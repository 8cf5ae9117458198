//! # meshmap
//!
//! Viewport and projection engine for mesh-network node maps.
//!
//! Turns node latitude/longitude readings into a pannable, zoomable
//! tile-space viewport: picks an outlier-resistant center for the initial
//! view, projects coordinates onto the canvas with spherical Web Mercator,
//! and maps drag/scroll/keyboard input to pan and zoom steps whose result is
//! persisted after a debounce window.

pub mod core;
pub mod data;
pub mod input;
pub mod nodes;
pub mod prelude;
pub mod runtime;
pub mod spatial;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapViewBuilder,
    geo::{haversine_km, is_valid_coordinate, CanvasSize, GeoCoordinate, Point},
    map::{MapView, NodeMarker},
    projection::{coordinate_to_viewport, geo_to_tile, project_to_screen, tile_offset_for_zoom},
    viewport::{Transition, ViewportState},
};

pub use data::store::{JsonFileStore, MemoryStore, PersistedViewport, ViewportStore};

pub use input::{events::InputEvent, handler::GestureController};

pub use nodes::registry::{NodeId, NodeRecord, NodeRegistry, StaticNodeRegistry};

pub use spatial::centroid::choose_center;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
/// Does nothing if a logger is already installed.
#[cfg(feature = "debug")]
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
