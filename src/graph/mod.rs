//! Event graph data model
//!
//! This module turns raw node/edge records into the indexed form the
//! analysis stages work on:
//! - Closed node type set with identifier-based classification
//! - Loosely typed node attributes
//! - Dense adjacency matrix with last-write-wins edge weights
//! - One mutable feature record per node

pub mod features;
pub mod input;
pub mod model;
pub mod property;
pub mod types;

// Re-export main types
pub use features::{FeatureRecord, FeatureStore};
pub use input::{EdgeInput, GraphInput, NodeInput, DEFAULT_CRITICALITY, DEFAULT_EDGE_WEIGHT};
pub use model::{GraphModel, ResolvedNode};
pub use property::{PropertyMap, PropertyValue};
pub use types::{classify_node_type, NodeType, UnknownNodeType};
