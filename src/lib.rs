//! Threatgraph
//!
//! Security risk analysis over directed, weighted event graphs extracted
//! from logs. A graph of actors, services, resources and alerts goes in; a
//! report with structural metrics, anomaly scores, DREAD risk scores and
//! reconstructed threat paths comes out.
//!
//! # Pipeline
//!
//! 1. Graph model: closed id set, node classification, dense adjacency
//! 2. All-pairs shortest paths (Dijkstra per source, in parallel)
//! 3. PageRank, betweenness centrality, clustering coefficient
//! 4. Anomaly detection (`mean + k * stddev` over per-node scores)
//! 5. DREAD scoring
//! 6. Threat path reconstruction and per-category breakdowns
//!
//! ## Example Usage
//!
//! ```rust
//! use threatgraph::{Analyzer, EdgeInput, NodeInput};
//!
//! let nodes = vec![NodeInput::new("user1"), NodeInput::new("attacker1")];
//! let edges = vec![
//!     EdgeInput::new("user1", "service1"),
//!     EdgeInput::new("attacker1", "server1").with_weight(2.0),
//! ];
//!
//! let report = Analyzer::default().analyze(&nodes, &edges).unwrap();
//! assert_eq!(report.overview.total_nodes, 4);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod analysis;
pub mod config;
pub mod graph;
pub mod http;

// Re-export main types for convenience
pub use graph::{
    classify_node_type, EdgeInput, FeatureRecord, FeatureStore, GraphInput, GraphModel,
    NodeInput, NodeType, PropertyMap, PropertyValue,
};

pub use analysis::{
    AnalysisError, AnalysisReport, AnalysisResult, Analyzer, Anomaly, Deadline, DreadScorer,
    RiskFactor, ThreatPath,
};

pub use config::{AnalysisConfig, ConfigError, ConfigResult, DetectorConfig, DreadWeights};

pub use http::HttpServer;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
