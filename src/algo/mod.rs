//! Graph algorithms module
//!
//! Algorithms are implemented in the `threatgraph-algorithms` crate.
//! This module provides the integration/adapter layer: it projects a
//! [`GraphModel`] into a [`GraphView`] and writes results into the feature
//! store, one stage at a time.

use crate::analysis::{AnalysisError, AnalysisResult, Deadline};
use crate::graph::{FeatureStore, GraphModel};
use tracing::debug;

// Re-export algorithms
pub use threatgraph_algorithms::{
    all_pairs_shortest_paths, all_pairs_with_interrupt, average_path_length,
    betweenness_from_trees, clustering_coefficient, dijkstra_tree, graph_density, page_rank,
    page_rank_with_interrupt, DanglingPolicy, GraphView, NodeIndex, PageRankConfig,
    PageRankResult, ShortestPathTree,
};

/// Build a GraphView from the model for algorithm execution.
///
/// Strictly positive matrix cells become edges; neighbour order follows
/// node index order.
pub fn build_view(model: &GraphModel) -> GraphView {
    GraphView::from_dense(model.adjacency())
}

/// One Dijkstra tree per node, aborting between sources once the deadline passes
pub fn shortest_path_table(
    view: &GraphView,
    deadline: &Deadline,
) -> AnalysisResult<Vec<ShortestPathTree>> {
    let trees = all_pairs_with_interrupt(view, || deadline.is_expired())
        .ok_or(AnalysisError::DeadlineExceeded { stage: "shortest_paths" })?;
    debug!("Computed {} shortest-path trees", trees.len());
    Ok(trees)
}

/// Run PageRank and store each node's rank in its feature record
pub fn apply_page_rank(
    view: &GraphView,
    features: &mut FeatureStore,
    config: PageRankConfig,
    deadline: &Deadline,
) -> AnalysisResult<PageRankResult> {
    let result = page_rank_with_interrupt(view, config, || deadline.is_expired())
        .ok_or(AnalysisError::DeadlineExceeded { stage: "page_rank" })?;

    features.assign(&result.scores, |record, score| record.page_rank = score);
    debug!(
        "PageRank finished after {} iterations (converged: {})",
        result.iterations, result.converged
    );
    Ok(result)
}

/// Betweenness from the all-pairs table
pub fn apply_betweenness(trees: &[ShortestPathTree], features: &mut FeatureStore) {
    let scores = betweenness_from_trees(features.len(), trees);
    features.assign(&scores, |record, score| record.betweenness_centrality = score);
}

pub fn apply_clustering(view: &GraphView, features: &mut FeatureStore) {
    let scores = clustering_coefficient(view);
    features.assign(&scores, |record, score| record.clustering_coefficient = score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeInput, NodeInput};

    fn model() -> GraphModel {
        GraphModel::build(
            &[NodeInput::new("user1"), NodeInput::new("isolated-host")],
            &[
                EdgeInput::new("user1", "service1"),
                EdgeInput::new("service1", "server1"),
                EdgeInput::new("user1", "server1").with_weight(5.0),
            ],
        )
    }

    #[test]
    fn test_graph_view_projection() {
        let model = model();
        let view = build_view(&model);

        assert_eq!(view.node_count, 4);
        let user = model.index_of("user1").unwrap();
        let service = model.index_of("service1").unwrap();
        assert!(view.has_edge(user, service));
        assert_eq!(view.out_degree(user), 2);
        assert_eq!(view.in_degree(model.index_of("isolated-host").unwrap()), 0);
    }

    #[test]
    fn test_stages_write_features() {
        let model = model();
        let view = build_view(&model);
        let mut features = model.init_features();
        let deadline = Deadline::none();

        let trees = shortest_path_table(&view, &deadline).unwrap();
        apply_page_rank(&view, &mut features, PageRankConfig::default(), &deadline).unwrap();
        apply_betweenness(&trees, &mut features);
        apply_clustering(&view, &mut features);

        let total: f64 = features.iter().map(|r| r.page_rank).sum();
        assert!((total - 1.0).abs() < 1e-9);

        // user1 -> service1 -> server1 (cost 2) beats the direct edge (cost 5)
        let service = features.get("service1").unwrap();
        assert!(service.betweenness_centrality > 0.0);
        assert_eq!(features.get("user1").unwrap().clustering_coefficient, 1.0);
        assert_eq!(features.get("isolated-host").unwrap().betweenness_centrality, 0.0);
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let model = model();
        let view = build_view(&model);
        let mut features = model.init_features();
        let expired = Deadline::after(std::time::Duration::ZERO);

        assert!(matches!(
            shortest_path_table(&view, &expired),
            Err(AnalysisError::DeadlineExceeded { stage: "shortest_paths" })
        ));
        assert!(matches!(
            apply_page_rank(&view, &mut features, PageRankConfig::default(), &expired),
            Err(AnalysisError::DeadlineExceeded { stage: "page_rank" })
        ));
    }
}
