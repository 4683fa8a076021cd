//! Threat path reconstruction
//!
//! Connects suspected sources (hostile or unknown nodes, or anything with a
//! non-zero anomaly score) to every anomalous node they can reach, using the
//! canonical shortest path from the all-pairs table.

use super::anomaly::Anomaly;
use crate::algo::ShortestPathTree;
use crate::graph::{FeatureStore, GraphModel, NodeType};
use serde::{Deserialize, Serialize};

/// A ranked path from a suspected source to an anomalous target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatPath {
    pub source: String,
    pub target: String,
    pub path: Vec<String>,
    pub distance: f64,
    pub risk_score: f64,
    pub anomaly_score: f64,
}

/// Fixed risk contribution of a node's type
pub fn type_risk(node_type: NodeType) -> f64 {
    match node_type {
        NodeType::Attacker => 3.0,
        NodeType::Attack => 2.5,
        NodeType::Alert | NodeType::Database => 1.5,
        NodeType::Server => 1.2,
        NodeType::Service => 1.0,
        _ => 0.5,
    }
}

/// Mean over the path of anomaly score + DREAD score + type risk
pub fn path_risk_score(path: &[usize], features: &FeatureStore) -> f64 {
    if path.is_empty() {
        return 0.0;
    }
    let total: f64 = path
        .iter()
        .filter_map(|&idx| features.by_index(idx))
        .map(|r| r.anomaly_score + r.dread_score + type_risk(r.node_type))
        .sum();
    total / path.len() as f64
}

fn is_suspected_source(node_type: NodeType, anomaly_score: f64) -> bool {
    matches!(node_type, NodeType::Attacker | NodeType::Attack | NodeType::Unknown)
        || anomaly_score != 0.0
}

/// Build threat paths for every (anomaly, suspected source) pair with a
/// finite path of at least two nodes, sorted by descending risk.
pub fn reconstruct_threat_paths(
    anomalies: &[Anomaly],
    model: &GraphModel,
    features: &FeatureStore,
    trees: &[ShortestPathTree],
) -> Vec<ThreatPath> {
    let sources: Vec<usize> = features
        .iter()
        .enumerate()
        .filter(|(_, r)| is_suspected_source(r.node_type, r.anomaly_score))
        .map(|(idx, _)| idx)
        .collect();

    let mut paths = Vec::new();
    for anomaly in anomalies {
        let Some(target) = model.index_of(&anomaly.node_id) else {
            continue;
        };

        for &source in &sources {
            if source == target {
                continue;
            }
            let Some(tree) = trees.get(source) else {
                continue;
            };
            if !tree.is_reachable(target) {
                continue;
            }

            let path = tree.path_to(target);
            if path.len() < 2 {
                continue;
            }

            paths.push(ThreatPath {
                source: model.id(source).to_string(),
                target: anomaly.node_id.clone(),
                risk_score: path_risk_score(&path, features),
                path: path.iter().map(|&idx| model.id(idx).to_string()).collect(),
                distance: tree.distance(target),
                anomaly_score: anomaly.score,
            });
        }
    }

    paths.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    paths
}
