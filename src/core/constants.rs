//! Core constants for the tile pyramid, projection and gesture handling.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Lowest level of the tile pyramid (one tile covers the world).
pub const MIN_ZOOM: u8 = 0;

/// Deepest level of the tile pyramid.
pub const MAX_ZOOM: u8 = 19;

/// Zoom used when a viewport is centered on the node cluster.
pub const DEFAULT_ZOOM: u8 = 10;

/// Largest latitude representable in spherical Web Mercator.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.05112878;

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum vertical scroll delta that counts as one zoom step.
pub const ZOOM_STEP_THRESHOLD: f64 = 1.0;

/// Accumulated drag distance (in pixels) that pans the viewport by one tile.
pub const DRAG_PAN_THRESHOLD: f64 = 64.0;

/// Quiet period before the latest viewport is handed to the persist callback.
pub const PERSIST_DEBOUNCE_MS: u64 = 500;

/// Points further than `median + factor * MAD` from the cluster center are outliers.
pub const MAD_OUTLIER_FACTOR: f64 = 3.5;

/// Below this many points the plain median center is used.
pub const MIN_ROBUST_SAMPLE: usize = 4;
