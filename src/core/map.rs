use crate::{
    core::{
        geo::{CanvasSize, GeoCoordinate, Point},
        projection,
        viewport::ViewportState,
    },
    input::{EventHandled, GestureController, InputEvent},
    nodes::registry::{format_node_id, NodeId, NodeRegistry},
    spatial::centroid::choose_center,
};

/// A node placed on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMarker {
    pub id: NodeId,
    pub coordinate: GeoCoordinate,
    pub position: Point,
    pub is_local: bool,
}

/// Viewport centered on the node cluster, or `None` when no node has a position
pub fn centered_viewport(registry: &dyn NodeRegistry, zoom: u8) -> Option<ViewportState> {
    let nodes = registry.snapshot();
    let center = choose_center(&nodes, registry.local_node_id())?;
    Some(projection::coordinate_to_viewport(&center, zoom as i32))
}

/// The map tab's view state: the live viewport, its gesture controller and
/// whether the view still follows the nodes automatically.
#[derive(Debug)]
pub struct MapView {
    gestures: GestureController,
    auto_center: bool,
}

impl MapView {
    pub(crate) fn new(gestures: GestureController, auto_center: bool) -> Self {
        Self {
            gestures,
            auto_center,
        }
    }

    pub fn viewport(&self) -> ViewportState {
        self.gestures.viewport()
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    /// Pan/zoom entry points for the host
    pub fn gestures_mut(&mut self) -> &mut GestureController {
        &mut self.gestures
    }

    /// True until the viewport was restored from settings or the user moved the map
    pub fn is_auto_centering(&self) -> bool {
        self.auto_center && !self.gestures.has_user_moved()
    }

    /// Re-centers on the current nodes while auto-centering is active.
    ///
    /// Returns whether the viewport was moved.
    pub fn refresh_center(&mut self, registry: &dyn NodeRegistry) -> bool {
        if !self.is_auto_centering() {
            return false;
        }

        let zoom = self.gestures.options().default_zoom;
        match centered_viewport(registry, zoom) {
            Some(viewport) if viewport != self.viewport() => {
                log::debug!(
                    "auto-centering to z{} ({}, {})",
                    viewport.zoom,
                    viewport.tile_x,
                    viewport.tile_y
                );
                self.gestures.reset_viewport(viewport);
                true
            }
            _ => false,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> EventHandled {
        self.gestures.handle_event(event)
    }

    pub fn project(&self, coord: &GeoCoordinate, canvas: CanvasSize) -> Option<Point> {
        projection::project_to_screen(coord, &self.viewport(), canvas)
    }

    /// Screen positions of every node with a valid coordinate
    pub fn project_nodes(&self, registry: &dyn NodeRegistry, canvas: CanvasSize) -> Vec<NodeMarker> {
        if !canvas.is_drawable() {
            return Vec::new();
        }

        let viewport = self.viewport();
        let local = registry.local_node_id();

        registry
            .snapshot()
            .iter()
            .filter_map(|node| {
                let coordinate = node.coordinate()?;
                let position = projection::project_to_screen(&coordinate, &viewport, canvas)?;
                Some(NodeMarker {
                    id: node.id,
                    coordinate,
                    position,
                    is_local: local == Some(node.id),
                })
            })
            .collect()
    }

    /// Writes any pending viewport change now
    pub fn flush(&self) -> bool {
        self.gestures.flush_persistence()
    }
}

impl NodeMarker {
    pub fn label(&self) -> String {
        format_node_id(self.id)
    }

    /// Whether the marker falls inside the canvas
    pub fn is_visible(&self, canvas: CanvasSize) -> bool {
        (0.0..=canvas.width as f64).contains(&self.position.x)
            && (0.0..=canvas.height as f64).contains(&self.position.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{builder::MapViewBuilder, constants::DEFAULT_ZOOM},
        nodes::registry::{NodeRecord, StaticNodeRegistry},
    };

    fn registry() -> StaticNodeRegistry {
        let mut registry = StaticNodeRegistry::new(Some(3));
        registry.upsert(NodeRecord::new(1, Some(52.52), Some(13.405)));
        registry.upsert(NodeRecord::new(2, None, None));
        registry.upsert(NodeRecord::new(3, Some(52.50), Some(13.40)));
        registry
    }

    #[test]
    fn test_centered_viewport_prefers_local_node() {
        let viewport = centered_viewport(&registry(), DEFAULT_ZOOM).unwrap();
        let expected =
            projection::coordinate_to_viewport(&GeoCoordinate::new(52.50, 13.40), DEFAULT_ZOOM as i32);
        assert_eq!(viewport, expected);

        assert_eq!(centered_viewport(&StaticNodeRegistry::default(), DEFAULT_ZOOM), None);
    }

    #[test]
    fn test_project_nodes() {
        let registry = registry();
        let view = MapViewBuilder::new().build(&registry);
        let canvas = CanvasSize::new(800, 600);

        let markers = view.project_nodes(&registry, canvas);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.is_visible(canvas)));
        assert!(markers.iter().any(|m| m.is_local && m.label() == "!00000003"));

        assert!(view.project_nodes(&registry, CanvasSize::new(0, 0)).is_empty());
    }

    #[test]
    fn test_refresh_center_follows_nodes_until_user_moves() {
        let mut registry = StaticNodeRegistry::new(None);
        let mut view = MapViewBuilder::new().build(&registry);
        assert_eq!(view.viewport(), ViewportState::default());
        assert!(view.is_auto_centering());

        registry.upsert(NodeRecord::new(9, Some(-33.86), Some(151.2)));
        assert!(view.refresh_center(&registry));
        assert_eq!(view.viewport().zoom, DEFAULT_ZOOM);
        assert!(!view.refresh_center(&registry));

        view.gestures_mut().pan_east();
        registry.upsert(NodeRecord::new(9, Some(40.0), Some(-70.0)));
        assert!(!view.is_auto_centering());
        assert!(!view.refresh_center(&registry));
    }
}
