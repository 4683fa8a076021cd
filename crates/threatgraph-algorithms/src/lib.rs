//! Topology-only graph algorithms used by the threatgraph analyzer.
//!
//! Everything here works on dense node indices through [`GraphView`]; mapping
//! indices back to identifiers is the caller's job.

pub mod common;
pub mod pagerank;
pub mod pathfinding;
pub mod centrality;
pub mod topology;

pub use common::{GraphView, NodeIndex};
pub use pagerank::{page_rank, page_rank_with_interrupt, DanglingPolicy, PageRankConfig, PageRankResult};
pub use pathfinding::{all_pairs_shortest_paths, all_pairs_with_interrupt, dijkstra_tree, ShortestPathTree};
pub use centrality::betweenness_from_trees;
pub use topology::{average_path_length, clustering_coefficient, graph_density};
