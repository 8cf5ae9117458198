//! Outlier-resistant center selection for a set of node positions.
//!
//! A plain mean is dragged away by a single node reporting a bad GPS fix.
//! The center here is a per-axis median, refined by discarding points whose
//! distance from it is far above the median distance (median absolute
//! deviation test).

use crate::{
    core::{
        constants::{MAD_OUTLIER_FACTOR, MIN_ROBUST_SAMPLE},
        geo::{haversine_km, GeoCoordinate},
    },
    nodes::registry::{format_node_id, NodeId, NodeRecord},
};

/// Median of `values`; the mean of the two middle values for even lengths, 0 when empty
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn median_coordinate(points: &[GeoCoordinate]) -> GeoCoordinate {
    let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
    let lons: Vec<f64> = points.iter().map(|p| p.longitude).collect();
    GeoCoordinate::new(median(&lats), median(&lons))
}

/// Robust cluster center of `points`, or `None` when there are none
pub fn robust_center(points: &[GeoCoordinate]) -> Option<GeoCoordinate> {
    if points.is_empty() {
        return None;
    }

    let center = median_coordinate(points);
    if points.len() < MIN_ROBUST_SAMPLE {
        return Some(center);
    }

    let distances: Vec<f64> = points.iter().map(|p| haversine_km(&center, p)).collect();
    let dist_median = median(&distances);
    let deviations: Vec<f64> = distances.iter().map(|d| (d - dist_median).abs()).collect();
    let mad = median(&deviations);

    // Tight or degenerate cluster
    if mad <= 0.0 {
        return Some(center);
    }

    let threshold = dist_median + MAD_OUTLIER_FACTOR * mad;
    let filtered: Vec<GeoCoordinate> = points
        .iter()
        .zip(&distances)
        .filter(|(_, d)| **d <= threshold)
        .map(|(p, _)| *p)
        .collect();

    if filtered.is_empty() {
        return Some(center);
    }

    log::debug!(
        "robust center: dropped {} of {} points beyond {:.3} km",
        points.len() - filtered.len(),
        points.len(),
        threshold
    );

    Some(median_coordinate(&filtered))
}

/// Picks the coordinate the map should initially center on.
///
/// A valid position for `preferred` (usually the local device) always wins.
/// Otherwise the robust center of every valid position is used. Returns
/// `None` when no node has a usable position.
pub fn choose_center(nodes: &[NodeRecord], preferred: Option<NodeId>) -> Option<GeoCoordinate> {
    let mut points = Vec::with_capacity(nodes.len());

    for node in nodes {
        let Some(coord) = node.coordinate() else {
            continue;
        };
        if preferred == Some(node.id) {
            log::debug!("centering on preferred node {}", format_node_id(node.id));
            return Some(coord);
        }
        points.push(coord);
    }

    robust_center(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, lat: f64, lon: f64) -> NodeRecord {
        NodeRecord::new(id, Some(lat), Some(lon))
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[4.0]), 4.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[-1.0, -1.0]), -1.0);
    }

    #[test]
    fn test_no_valid_positions() {
        let nodes = vec![
            NodeRecord::new(1, None, None),
            NodeRecord::new(2, Some(10.0), None),
            node(3, f64::NAN, 4.0),
            node(4, 95.0, 4.0),
        ];
        assert_eq!(choose_center(&nodes, None), None);
        assert_eq!(choose_center(&[], Some(1)), None);
    }

    #[test]
    fn test_small_sample_uses_median() {
        let nodes = vec![node(1, 10.0, 20.0), node(2, 12.0, 22.0), node(3, 50.0, 80.0)];
        let center = choose_center(&nodes, None).unwrap();
        assert_eq!(center, GeoCoordinate::new(12.0, 22.0));
    }

    #[test]
    fn test_outlier_rejected() {
        // Three nodes within ~1 km, one roughly 500 km north
        let nodes = vec![
            node(1, 52.5200, 13.4050),
            node(2, 52.5230, 13.4100),
            node(3, 52.5180, 13.4000),
            node(4, 57.0200, 13.4050),
        ];
        let center = choose_center(&nodes, None).unwrap();
        let cluster = GeoCoordinate::new(52.5200, 13.4050);
        assert!(haversine_km(&center, &cluster) < 1.0, "{center:?}");
    }

    #[test]
    fn test_outlier_rejected_in_larger_set() {
        let mut nodes: Vec<NodeRecord> = (0..8)
            .map(|i| node(i, 40.0 + i as f64 * 0.001, -3.0 + i as f64 * 0.002))
            .collect();
        nodes.push(node(100, -10.0, 60.0));
        nodes.push(node(101, 0.0, 0.0));

        let center = choose_center(&nodes, None).unwrap();
        assert!(haversine_km(&center, &GeoCoordinate::new(40.0035, -2.993)) < 1.0);
    }

    #[test]
    fn test_identical_points_are_degenerate() {
        let nodes: Vec<NodeRecord> = (0..5).map(|i| node(i, 1.5, 2.5)).collect();
        assert_eq!(
            choose_center(&nodes, None),
            Some(GeoCoordinate::new(1.5, 2.5))
        );
    }

    #[test]
    fn test_preferred_node_wins() {
        let nodes = vec![
            node(1, 52.5200, 13.4050),
            node(2, 52.5230, 13.4100),
            node(0xdead_beef, -45.0, 170.0),
            node(3, 52.5180, 13.4000),
        ];
        let center = choose_center(&nodes, Some(0xdead_beef)).unwrap();
        assert_eq!(center, GeoCoordinate::new(-45.0, 170.0));
    }

    #[test]
    fn test_preferred_without_position_is_ignored() {
        let nodes = vec![
            NodeRecord::new(7, None, None),
            node(1, 10.0, 10.0),
            node(2, 20.0, 20.0),
        ];
        assert_eq!(
            choose_center(&nodes, Some(7)),
            Some(GeoCoordinate::new(15.0, 15.0))
        );
    }
}
