//! Read-only view of the node registry used for positioning.

use crate::{
    core::geo::{is_valid_coordinate, GeoCoordinate},
    Result,
};
use serde::{Deserialize, Serialize};

/// Mesh node number
pub type NodeId = u32;

/// Formats a node number the way mesh clients display it (`!1a2b3c4d`)
pub fn format_node_id(id: NodeId) -> String {
    format!("!{id:08x}")
}

/// A node as seen by the registry; freshly heard nodes often have no position yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NodeRecord {
    pub fn new(id: NodeId, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            id,
            latitude,
            longitude,
        }
    }

    /// The node's position if both components are present and valid
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if is_valid_coordinate(lat, lon) => {
                Some(GeoCoordinate::new(lat, lon))
            }
            _ => None,
        }
    }
}

/// Positions of every node that has a usable coordinate, in registry order
pub fn positions(records: &[NodeRecord]) -> Vec<(NodeId, GeoCoordinate)> {
    records
        .iter()
        .filter_map(|record| record.coordinate().map(|coord| (record.id, coord)))
        .collect()
}

/// Source of node positions for the map
pub trait NodeRegistry {
    /// Current nodes in a stable order
    fn snapshot(&self) -> Vec<NodeRecord>;

    /// Node number of the local device, once known
    fn local_node_id(&self) -> Option<NodeId>;

    fn is_local(&self, id: NodeId) -> bool {
        self.local_node_id() == Some(id)
    }
}

/// In-memory registry, loadable from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticNodeRegistry {
    #[serde(default)]
    pub local_node_id: Option<NodeId>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl StaticNodeRegistry {
    pub fn new(local_node_id: Option<NodeId>) -> Self {
        Self {
            local_node_id,
            nodes: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Inserts a node or replaces the record with the same id in place
    pub fn upsert(&mut self, record: NodeRecord) {
        match self.nodes.iter_mut().find(|n| n.id == record.id) {
            Some(existing) => *existing = record,
            None => self.nodes.push(record),
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<NodeRecord> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(index))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeRegistry for StaticNodeRegistry {
    fn snapshot(&self) -> Vec<NodeRecord> {
        self.nodes.clone()
    }

    fn local_node_id(&self) -> Option<NodeId> {
        self.local_node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_node_id() {
        assert_eq!(format_node_id(0x1a2b3c4d), "!1a2b3c4d");
        assert_eq!(format_node_id(42), "!0000002a");
    }

    #[test]
    fn test_coordinate_requires_both_components() {
        assert_eq!(NodeRecord::new(1, Some(1.0), None).coordinate(), None);
        assert_eq!(NodeRecord::new(1, None, Some(1.0)).coordinate(), None);
        assert_eq!(NodeRecord::new(1, Some(f64::INFINITY), Some(1.0)).coordinate(), None);
        assert_eq!(
            NodeRecord::new(1, Some(1.0), Some(2.0)).coordinate(),
            Some(GeoCoordinate::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_positions_skip_unpositioned() {
        let records = vec![
            NodeRecord::new(1, Some(1.0), Some(2.0)),
            NodeRecord::new(2, None, None),
            NodeRecord::new(3, Some(-91.0), Some(2.0)),
            NodeRecord::new(4, Some(3.0), Some(4.0)),
        ];
        let ids: Vec<NodeId> = positions(&records).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_upsert_and_remove() {
        let mut registry = StaticNodeRegistry::new(Some(9));
        registry.upsert(NodeRecord::new(1, None, None));
        registry.upsert(NodeRecord::new(2, Some(1.0), Some(1.0)));
        registry.upsert(NodeRecord::new(1, Some(5.0), Some(6.0)));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot()[0].latitude, Some(5.0));
        assert!(registry.is_local(9));
        assert!(!registry.is_local(1));

        assert!(registry.remove(2).is_some());
        assert!(registry.remove(2).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_json() {
        let registry = StaticNodeRegistry::from_json(
            r#"{"local_node_id": 7, "nodes": [{"id": 7, "latitude": 1.0, "longitude": 2.0}, {"id": 8}]}"#,
        )
        .unwrap();
        assert_eq!(registry.local_node_id(), Some(7));
        assert_eq!(registry.nodes[1].coordinate(), None);

        assert!(StaticNodeRegistry::from_json("{not json").is_err());
    }
}
