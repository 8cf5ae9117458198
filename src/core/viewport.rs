use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::{CanvasSize, GeoCoordinate, Point},
    projection,
};
use serde::{Deserialize, Serialize};

/// Discrete view of the tile pyramid: a zoom level and a tile-space offset.
///
/// The offset is not clamped to the pyramid, so panning past the edge of the
/// world is allowed and simply shows no tiles. `zoom` always stays in
/// `MIN_ZOOM..=MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: u8,
    pub tile_x: i32,
    pub tile_y: i32,
}

/// A single pan/zoom step of the viewport state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    PanNorth,
    PanSouth,
    PanEast,
    PanWest,
    ZoomIn,
    ZoomOut,
    SetZoom(i32),
}

impl ViewportState {
    /// Creates a viewport, clamping `zoom` into the pyramid
    pub fn new(zoom: u8, tile_x: i32, tile_y: i32) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            tile_x,
            tile_y,
        }
    }

    /// Viewport that shows `coord` in the middle of the canvas
    pub fn centered_on(coord: &GeoCoordinate, zoom: i32) -> Self {
        projection::coordinate_to_viewport(coord, zoom)
    }

    pub fn pan_north(&mut self) {
        self.pan_by(0, -1);
    }

    pub fn pan_south(&mut self) {
        self.pan_by(0, 1);
    }

    pub fn pan_east(&mut self) {
        self.pan_by(1, 0);
    }

    pub fn pan_west(&mut self) {
        self.pan_by(-1, 0);
    }

    /// Moves by whole tiles; positive `dx` is east, positive `dy` is south.
    /// Offsets saturate at the `i32` range.
    pub fn pan_by(&mut self, dx: i32, dy: i32) {
        self.tile_x = self.tile_x.saturating_add(dx);
        self.tile_y = self.tile_y.saturating_add(dy);
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    /// Goes one level deeper, doubling the offset (saturating). Returns false at the deepest level.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.zoom += 1;
        self.tile_x = self.tile_x.saturating_mul(2);
        self.tile_y = self.tile_y.saturating_mul(2);
        true
    }

    /// Goes one level up, halving the offset with truncation toward zero.
    ///
    /// Not an exact inverse of [`ViewportState::zoom_in`] once the offset is odd.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.tile_x /= 2;
        self.tile_y /= 2;
        self.zoom -= 1;
        true
    }

    /// Steps one level at a time toward `target` so the offset doubles/halves at each level
    pub fn set_zoom(&mut self, target: i32) -> bool {
        let target = target.clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8;
        let start = *self;

        while self.zoom < target {
            self.zoom_in();
        }
        while self.zoom > target {
            self.zoom_out();
        }

        *self != start
    }

    /// Applies a transition, returning whether the state changed
    pub fn apply(&mut self, transition: Transition) -> bool {
        let before = *self;
        match transition {
            Transition::PanNorth => self.pan_north(),
            Transition::PanSouth => self.pan_south(),
            Transition::PanEast => self.pan_east(),
            Transition::PanWest => self.pan_west(),
            Transition::ZoomIn => return self.zoom_in(),
            Transition::ZoomOut => return self.zoom_out(),
            Transition::SetZoom(target) => return self.set_zoom(target),
        }
        // A pan pinned at the i32 edge changes nothing
        *self != before
    }

    /// Screen position of `coord` on a canvas showing this viewport
    pub fn project(&self, coord: &GeoCoordinate, canvas: CanvasSize) -> Option<Point> {
        projection::project_to_screen(coord, self, canvas)
    }

    /// Geographic coordinate under the middle of the canvas
    pub fn center(&self, canvas: CanvasSize) -> Option<GeoCoordinate> {
        projection::screen_to_geo(canvas.center(), self, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_zoom() {
        assert_eq!(ViewportState::new(30, 1, 2).zoom, MAX_ZOOM);
        assert_eq!(ViewportState::default(), ViewportState::new(0, 0, 0));
    }

    #[test]
    fn test_pan() {
        let mut viewport = ViewportState::new(5, 0, 0);
        viewport.pan_east();
        viewport.pan_east();
        viewport.pan_north();
        assert_eq!(viewport, ViewportState::new(5, 2, -1));

        viewport.pan_west();
        viewport.pan_south();
        viewport.pan_south();
        assert_eq!(viewport, ViewportState::new(5, 1, 1));
    }

    #[test]
    fn test_zoom_round_trip() {
        let mut viewport = ViewportState::new(5, 2, -3);
        assert!(viewport.zoom_in());
        assert_eq!(viewport, ViewportState::new(6, 4, -6));
        assert!(viewport.zoom_out());
        assert_eq!(viewport, ViewportState::new(5, 2, -3));
    }

    #[test]
    fn test_zoom_out_truncates_toward_zero() {
        let mut viewport = ViewportState::new(6, 7, -7);
        viewport.zoom_out();
        assert_eq!(viewport, ViewportState::new(5, 3, -3));

        // 3 -> 6 -> pan -> 7 -> 3
        let mut viewport = ViewportState::new(5, 3, 0);
        viewport.zoom_in();
        viewport.pan_east();
        viewport.zoom_out();
        assert_eq!(viewport.tile_x, 3);
    }

    #[test]
    fn test_zoom_bounds_are_no_ops() {
        let mut top = ViewportState::new(MAX_ZOOM, 5, 5);
        assert!(!top.zoom_in());
        assert_eq!(top, ViewportState::new(MAX_ZOOM, 5, 5));

        let mut bottom = ViewportState::new(MIN_ZOOM, 5, -5);
        assert!(!bottom.zoom_out());
        assert_eq!(bottom, ViewportState::new(MIN_ZOOM, 5, -5));
    }

    #[test]
    fn test_set_zoom_steps_through_levels() {
        let mut viewport = ViewportState::new(3, 1, -1);
        viewport.set_zoom(6);
        assert_eq!(viewport, ViewportState::new(6, 8, -8));

        viewport.set_zoom(4);
        assert_eq!(viewport, ViewportState::new(4, 2, -2));

        viewport.set_zoom(100);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.set_zoom(-4);
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_set_zoom_idempotent() {
        let start = ViewportState::new(7, 13, -9);

        let mut once = start;
        once.set_zoom(3);

        let mut twice = start;
        twice.set_zoom(3);
        assert!(!twice.set_zoom(3));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_offsets_saturate_far_past_the_world_edge() {
        let mut viewport = ViewportState::new(0, 4096, -4096);
        viewport.set_zoom(MAX_ZOOM as i32);
        assert_eq!(viewport, ViewportState::new(MAX_ZOOM, i32::MAX, i32::MIN));

        assert!(!viewport.apply(Transition::PanEast));
        assert!(!viewport.apply(Transition::PanNorth));
        assert_eq!(viewport, ViewportState::new(MAX_ZOOM, i32::MAX, i32::MIN));

        viewport.pan_west();
        viewport.pan_south();
        assert_eq!(
            viewport,
            ViewportState::new(MAX_ZOOM, i32::MAX - 1, i32::MIN + 1)
        );

        viewport.zoom_out();
        assert_eq!(viewport.tile_x, (i32::MAX - 1) / 2);
    }

    #[test]
    fn test_apply_reports_change() {
        let mut viewport = ViewportState::new(MAX_ZOOM, 0, 0);
        assert!(!viewport.apply(Transition::ZoomIn));
        assert!(viewport.apply(Transition::PanEast));
        assert!(viewport.apply(Transition::ZoomOut));
        assert!(!viewport.apply(Transition::SetZoom(MAX_ZOOM as i32 - 1)));
        assert_eq!(viewport, ViewportState::new(MAX_ZOOM - 1, 0, 0));
    }
}
