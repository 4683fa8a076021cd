//! Analysis report
//!
//! The report is assembled once at the end of a run and never mutated. All
//! maps keep node order, so JSON output is deterministic.

use super::anomaly::{Anomaly, AnomalyOutcome};
use super::breakdown::{
    attack_summary, service_communication, system_health, user_behavior, AttackSummary,
    ServiceCommunication, SystemHealth, UserBehavior,
};
use super::threat::ThreatPath;
use crate::algo::{average_path_length, graph_density, PageRankResult, ShortestPathTree};
use crate::graph::{FeatureRecord, FeatureStore, GraphModel, NodeType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Graph-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_type_distribution: IndexMap<NodeType, usize>,
    pub avg_path_length: f64,
    pub graph_density: f64,
    pub anomaly_threshold: f64,
    pub anomaly_count: usize,
    pub page_rank_iterations: usize,
    pub page_rank_converged: bool,
}

/// Single-source shortest paths keyed by target id.
///
/// Unreachable targets have a `None` distance, serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathTable {
    pub distances: IndexMap<String, Option<f64>>,
    pub predecessors: IndexMap<String, Option<String>>,
}

impl PathTable {
    fn from_tree(model: &GraphModel, tree: &ShortestPathTree) -> Self {
        let distances = tree
            .distances
            .iter()
            .enumerate()
            .map(|(idx, &d)| (model.id(idx).to_string(), d.is_finite().then_some(d)))
            .collect();
        let predecessors = tree
            .predecessors
            .iter()
            .enumerate()
            .map(|(idx, prev)| (model.id(idx).to_string(), prev.map(|p| model.id(p).to_string())))
            .collect();
        PathTable {
            distances,
            predecessors,
        }
    }

    /// Distance to `target`; `None` when unreachable or unknown
    pub fn distance(&self, target: &str) -> Option<f64> {
        self.distances.get(target).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overview: Overview,
    pub anomalies: Vec<Anomaly>,
    pub threat_paths: Vec<ThreatPath>,
    pub user_behavior: IndexMap<String, UserBehavior>,
    pub service_analysis: IndexMap<String, ServiceCommunication>,
    pub system_health: SystemHealth,
    pub attack_analysis: IndexMap<String, AttackSummary>,
    pub shortest_paths: IndexMap<String, PathTable>,
    pub node_features: IndexMap<String, FeatureRecord>,
}

impl AnalysisReport {
    pub(crate) fn assemble(
        model: &GraphModel,
        features: &FeatureStore,
        trees: &[ShortestPathTree],
        outcome: AnomalyOutcome,
        threat_paths: Vec<ThreatPath>,
        page_rank: &PageRankResult,
    ) -> Self {
        let mut node_type_distribution = IndexMap::new();
        for record in features.iter() {
            *node_type_distribution.entry(record.node_type).or_insert(0) += 1;
        }

        let overview = Overview {
            total_nodes: model.node_count(),
            total_edges: model.edge_count(),
            node_type_distribution,
            avg_path_length: average_path_length(trees),
            graph_density: graph_density(model.node_count(), model.edge_count()),
            anomaly_threshold: outcome.threshold,
            anomaly_count: outcome.anomalies.len(),
            page_rank_iterations: page_rank.iterations,
            page_rank_converged: page_rank.converged,
        };

        let shortest_paths = trees
            .iter()
            .map(|tree| (model.id(tree.source).to_string(), PathTable::from_tree(model, tree)))
            .collect();

        AnalysisReport {
            overview,
            anomalies: outcome.anomalies,
            threat_paths,
            user_behavior: user_behavior(model, features),
            service_analysis: service_communication(model, features),
            system_health: system_health(model, features),
            attack_analysis: attack_summary(model, features),
            shortest_paths,
            node_features: features.to_map(),
        }
    }

    /// Anomalies with the highest scores first, at most `n`
    pub fn top_anomalies(&self, n: usize) -> &[Anomaly] {
        &self.anomalies[..n.min(self.anomalies.len())]
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
