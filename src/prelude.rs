//! Prelude module for common meshmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use meshmap::prelude::*;`

pub use crate::core::{
    builder::MapViewBuilder,
    config::{InteractionOptions, InteractionProfile},
    geo::{haversine_km, is_valid_coordinate, CanvasSize, GeoCoordinate, Point},
    map::{MapView, NodeMarker},
    projection::{
        coordinate_to_viewport, geo_to_tile, project_to_screen, screen_to_geo,
        tile_offset_for_zoom,
    },
    viewport::{Transition, ViewportState},
};

pub use crate::input::{
    debounce::Debouncer,
    events::{EventHandled, InputEvent, KeyCode},
    handler::GestureController,
};

pub use crate::data::store::{JsonFileStore, MemoryStore, PersistedViewport, ViewportStore};

pub use crate::nodes::registry::{NodeId, NodeRecord, NodeRegistry, StaticNodeRegistry};

pub use crate::spatial::centroid::{choose_center, robust_center};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};
