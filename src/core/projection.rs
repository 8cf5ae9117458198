//! Spherical Web Mercator in tile space.
//!
//! All functions here are pure. Tile coordinates are fractional positions in
//! the `2^zoom × 2^zoom` pyramid with `(0, 0)` at the north-west corner; the
//! viewport stores its offset relative to [`tile_offset_for_zoom`] so that a
//! `ViewportState { tile_x: 0, tile_y: 0 }` keeps the pyramid origin centered.

use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
    geo::{CanvasSize, GeoCoordinate, Point},
    viewport::ViewportState,
};
use std::f64::consts::PI;

/// Number of tiles per axis at `zoom`
fn tiles_per_axis(zoom: i32) -> f64 {
    2_f64.powi(zoom)
}

/// Projects a coordinate to fractional tile coordinates at `zoom`.
///
/// Latitude is clamped to the Mercator limit first so the poles do not diverge.
pub fn geo_to_tile(coord: &GeoCoordinate, zoom: u8) -> Point {
    let lat_rad = GeoCoordinate::clamp_lat(coord.latitude).to_radians();
    let n = tiles_per_axis(zoom as i32);

    let x = (coord.longitude + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    Point::new(x, y)
}

/// Inverse of [`geo_to_tile`]
pub fn tile_to_geo(tile: Point, zoom: u8) -> GeoCoordinate {
    let n = tiles_per_axis(zoom as i32);
    let lon = tile.x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * tile.y / n)).sinh().atan().to_degrees();
    GeoCoordinate::new(lat, lon)
}

/// Tile-space offset that puts the pyramid's origin tile under a zero viewport offset
pub fn tile_offset_for_zoom(zoom: i32) -> i32 {
    let n = tiles_per_axis(zoom.max(0));
    (n / 2.0 - 0.5).floor() as i32
}

/// Builds the viewport that shows `coord` in the middle of the canvas at `zoom`
pub fn coordinate_to_viewport(coord: &GeoCoordinate, zoom: i32) -> ViewportState {
    let zoom = zoom.clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8;
    let tile = geo_to_tile(coord, zoom);

    // At zoom 0 there is a single tile, so only half a tile of bias is needed.
    let center_bias = if zoom == 0 { 0.5 } else { 1.0 };
    let offset = tile_offset_for_zoom(zoom as i32);

    ViewportState {
        zoom,
        tile_x: (tile.x - center_bias).round() as i32 - offset,
        tile_y: (tile.y - center_bias).round() as i32 - offset,
    }
}

/// Pixel position of the anchor tile's top-left corner for a canvas
fn mid_tile_anchor(viewport: &ViewportState, canvas: CanvasSize) -> Point {
    let tile = TILE_SIZE as i32;
    let mut mid_x = ((canvas.width - 2 * tile) / 2) as f64;
    let mut mid_y = ((canvas.height - 2 * tile) / 2) as f64;

    if viewport.zoom == 0 {
        mid_x += TILE_SIZE as f64 / 2.0;
        mid_y += TILE_SIZE as f64 / 2.0;
    }

    Point::new(mid_x, mid_y)
}

/// Absolute tile coordinates of the viewport anchor
fn absolute_anchor(viewport: &ViewportState) -> Point {
    let offset = tile_offset_for_zoom(viewport.zoom as i32);
    Point::new(
        (viewport.tile_x + offset) as f64,
        (viewport.tile_y + offset) as f64,
    )
}

/// Places a coordinate on the canvas for the given viewport.
///
/// Returns `None` when the canvas has no drawable area.
pub fn project_to_screen(
    coord: &GeoCoordinate,
    viewport: &ViewportState,
    canvas: CanvasSize,
) -> Option<Point> {
    if !canvas.is_drawable() {
        return None;
    }

    let mid = mid_tile_anchor(viewport, canvas);
    let anchor = absolute_anchor(viewport);
    let tile = geo_to_tile(coord, viewport.zoom);
    let size = TILE_SIZE as f64;

    Some(Point::new(
        mid.x + (tile.x - anchor.x) * size,
        mid.y + (tile.y - anchor.y) * size,
    ))
}

/// Geographic coordinate under a canvas pixel; inverse of [`project_to_screen`]
pub fn screen_to_geo(
    pixel: Point,
    viewport: &ViewportState,
    canvas: CanvasSize,
) -> Option<GeoCoordinate> {
    if !canvas.is_drawable() {
        return None;
    }

    let mid = mid_tile_anchor(viewport, canvas);
    let anchor = absolute_anchor(viewport);
    let size = TILE_SIZE as f64;
    let tile = Point::new(
        anchor.x + (pixel.x - mid.x) / size,
        anchor.y + (pixel.y - mid.y) / size,
    );

    Some(tile_to_geo(tile, viewport.zoom))
}
