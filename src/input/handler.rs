use crate::{
    core::{
        config::InteractionOptions,
        constants::TILE_SIZE,
        geo::{CanvasSize, Point},
        viewport::{Transition, ViewportState},
    },
    input::{
        debounce::Debouncer,
        events::{EventHandled, InputEvent, KeyCode},
    },
};

/// Translates pointer and keyboard input into viewport transitions.
///
/// The controller is the single writer of its [`ViewportState`]. Every change
/// made through it schedules a debounced persist of the resulting state; only
/// the last state of a burst reaches the persist callback.
#[derive(Debug)]
pub struct GestureController {
    viewport: ViewportState,
    options: InteractionOptions,
    canvas: Option<CanvasSize>,
    drag_accumulator: Point,
    persist: Option<Debouncer<ViewportState>>,
    user_moved: bool,
}

impl GestureController {
    pub fn new(viewport: ViewportState, options: InteractionOptions) -> Self {
        Self {
            viewport,
            options: options.sanitized(),
            canvas: None,
            drag_accumulator: Point::default(),
            persist: None,
            user_moved: false,
        }
    }

    /// Registers the callback that receives `(zoom, tile_x, tile_y)` once input settles
    pub fn on_persist<F>(&mut self, callback: F)
    where
        F: Fn(ViewportState) + Send + Sync + 'static,
    {
        if let Some(previous) = self.persist.take() {
            previous.flush();
        }
        self.persist = Some(Debouncer::new(self.options.persist_debounce(), callback));
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn options(&self) -> &InteractionOptions {
        &self.options
    }

    /// Whether any input has moved the map since construction
    pub fn has_user_moved(&self) -> bool {
        self.user_moved
    }

    /// Places the viewport programmatically, without persisting it
    pub fn reset_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.drag_accumulator = Point::default();
    }

    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        self.canvas = Some(canvas);
    }

    fn committed(&mut self, changed: bool) -> bool {
        if changed {
            self.user_moved = true;
            log::debug!(
                "viewport -> z{} ({}, {})",
                self.viewport.zoom,
                self.viewport.tile_x,
                self.viewport.tile_y
            );
            if let Some(persist) = &self.persist {
                persist.schedule(self.viewport);
            }
        }
        changed
    }

    /// Applies a transition and schedules persistence if the state changed
    pub fn apply(&mut self, transition: Transition) -> bool {
        let changed = self.viewport.apply(transition);
        self.committed(changed)
    }

    pub fn pan_north(&mut self) -> bool {
        self.apply(Transition::PanNorth)
    }

    pub fn pan_south(&mut self) -> bool {
        self.apply(Transition::PanSouth)
    }

    pub fn pan_east(&mut self) -> bool {
        self.apply(Transition::PanEast)
    }

    pub fn pan_west(&mut self) -> bool {
        self.apply(Transition::PanWest)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.apply(Transition::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.apply(Transition::ZoomOut)
    }

    pub fn set_zoom(&mut self, target: i32) -> bool {
        self.apply(Transition::SetZoom(target))
    }

    /// Tiles to pan after a zoom-in so the point under the cursor stays put.
    ///
    /// Doubling the offset keeps the canvas center fixed; a point `d` pixels
    /// away from it ends up `2d` away, so the view follows by `d` pixels.
    fn cursor_nudge(&self, position: Point) -> (i32, i32) {
        let Some(canvas) = self.canvas.filter(CanvasSize::is_drawable) else {
            return (0, 0);
        };
        if !(position.x.is_finite() && position.y.is_finite()) {
            return (0, 0);
        }

        let center = canvas.center();
        let x = position.x.clamp(0.0, canvas.width as f64);
        let y = position.y.clamp(0.0, canvas.height as f64);
        let size = TILE_SIZE as f64;

        (
            ((x - center.x) / size).round() as i32,
            ((y - center.y) / size).round() as i32,
        )
    }

    /// Scroll-to-zoom. Zooming in leans toward the cursor, zooming out does not.
    pub fn handle_scroll(&mut self, delta: f64, position: Point) -> EventHandled {
        let threshold = self.options.zoom_step_threshold;

        let changed = if delta >= threshold {
            let zoomed = self.viewport.zoom_in();
            if zoomed && self.options.zoom_to_cursor {
                let (dx, dy) = self.cursor_nudge(position);
                self.viewport.pan_by(dx, dy);
            }
            zoomed
        } else if delta <= -threshold {
            self.viewport.zoom_out()
        } else {
            false
        };

        EventHandled::from_changed(self.committed(changed))
    }

    /// Drag-to-pan. The map content follows the pointer: dragging right
    /// reveals what lies west.
    pub fn handle_drag(&mut self, delta: Point) -> EventHandled {
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return EventHandled::NotHandled;
        }

        let threshold = self.options.drag_pan_threshold;
        self.drag_accumulator = self.drag_accumulator.add(&delta);

        let steps_x = (self.drag_accumulator.x / threshold).trunc();
        let steps_y = (self.drag_accumulator.y / threshold).trunc();
        self.drag_accumulator.x -= steps_x * threshold;
        self.drag_accumulator.y -= steps_y * threshold;

        // `as` saturates, and negation must not overflow at i32::MIN
        let (dx, dy) = (
            (steps_x as i32).saturating_neg(),
            (steps_y as i32).saturating_neg(),
        );
        let changed = dx != 0 || dy != 0;
        if changed {
            self.viewport.pan_by(dx, dy);
        }

        EventHandled::from_changed(self.committed(changed))
    }

    /// Forgets any partial drag distance
    pub fn end_drag(&mut self) {
        self.drag_accumulator = Point::default();
    }

    pub fn handle_key(&mut self, key: KeyCode) -> EventHandled {
        if !self.options.keyboard {
            return EventHandled::NotHandled;
        }

        let changed = match key {
            KeyCode::ArrowUp => self.pan_north(),
            KeyCode::ArrowDown => self.pan_south(),
            KeyCode::ArrowLeft => self.pan_west(),
            KeyCode::ArrowRight => self.pan_east(),
            KeyCode::Plus => self.zoom_in(),
            KeyCode::Minus => self.zoom_out(),
            KeyCode::Home => self.set_zoom(self.options.default_zoom as i32),
            KeyCode::Other(_) => false,
        };

        EventHandled::from_changed(changed)
    }

    pub fn handle_event(&mut self, event: InputEvent) -> EventHandled {
        match event {
            InputEvent::Scroll { delta, position } => self.handle_scroll(delta, position),
            InputEvent::Drag { delta } => self.handle_drag(delta),
            InputEvent::DragEnd => {
                self.end_drag();
                EventHandled::Handled
            }
            InputEvent::KeyPress { key } => self.handle_key(key),
            InputEvent::Resize { size } => {
                self.set_canvas_size(CanvasSize::from_point(size));
                EventHandled::Handled
            }
        }
    }

    /// Persists any pending state immediately
    pub fn flush_persistence(&self) -> bool {
        self.persist.as_ref().is_some_and(|persist| persist.flush())
    }

    pub fn has_pending_persist(&self) -> bool {
        self.persist.as_ref().is_some_and(|persist| persist.is_pending())
    }
}
