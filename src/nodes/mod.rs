pub mod registry;

pub use registry::{format_node_id, positions, NodeId, NodeRecord, NodeRegistry, StaticNodeRegistry};
