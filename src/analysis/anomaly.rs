//! Statistical anomaly detection
//!
//! Each node collects a score from independent signals (degree z-scores,
//! hostile or alert types, service error responses, excessive resource
//! access). A node is anomalous when its score is strictly above
//! `mean + k * stddev` of all scores.

use crate::config::AnalysisConfig;
use crate::graph::{FeatureStore, GraphModel, NodeType};
use serde::{Deserialize, Serialize};

/// Relative spread below which a distribution counts as constant
const FLAT_EPSILON: f64 = 1e-12;

/// A node whose score exceeded the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub node_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

/// Mean and population standard deviation of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub mean: f64,
    pub std_dev: f64,
    /// All values equal, up to float noise
    pub flat: bool,
}

impl DistributionStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return DistributionStats {
                mean: 0.0,
                std_dev: 0.0,
                flat: true,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let flat = max - min <= FLAT_EPSILON * max.abs().max(1.0);

        DistributionStats {
            mean,
            std_dev: if flat { 0.0 } else { variance.sqrt() },
            flat,
        }
    }

    pub fn threshold(&self, k: f64) -> f64 {
        self.mean + k * self.std_dev
    }

    /// Standard score; 0 for a flat distribution
    pub fn z_score(&self, value: f64) -> f64 {
        if self.flat {
            0.0
        } else {
            (value - self.mean) / self.std_dev
        }
    }

    /// Strictly above `mean + k * stddev`; never true for a flat distribution
    pub fn exceeds(&self, value: f64, k: f64) -> bool {
        !self.flat && value > self.threshold(k)
    }
}

/// Detector output plus the statistics behind the threshold
#[derive(Debug, Clone, Default)]
pub struct AnomalyOutcome {
    /// Descending by score; ties keep node order
    pub anomalies: Vec<Anomaly>,
    pub threshold: f64,
    pub stats: DistributionStats,
}

/// Score every node, write score and reasons into its feature record and
/// return the nodes above the threshold.
pub fn detect_anomalies(
    model: &GraphModel,
    features: &mut FeatureStore,
    config: &AnalysisConfig,
) -> AnomalyOutcome {
    let k = config.anomaly_threshold;
    let weights = &config.detector;

    let in_degrees: Vec<f64> = features.iter().map(|r| r.in_degree as f64).collect();
    let out_degrees: Vec<f64> = features.iter().map(|r| r.out_degree as f64).collect();
    let in_stats = DistributionStats::from_values(&in_degrees);
    let out_stats = DistributionStats::from_values(&out_degrees);
    let out_threshold = out_stats.threshold(k);

    let mut scores = Vec::with_capacity(features.len());
    for (idx, record) in features.iter_mut().enumerate() {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        let in_degree = record.in_degree as f64;
        if in_stats.exceeds(in_degree, k) {
            let z = in_stats.z_score(in_degree);
            score += weights.degree_weight * z;
            reasons.push(format!("High in-degree ({} incoming, z={:.2})", record.in_degree, z));
        }

        let out_degree = record.out_degree as f64;
        if out_stats.exceeds(out_degree, k) {
            let z = out_stats.z_score(out_degree);
            score += weights.degree_weight * z;
            reasons.push(format!("High out-degree ({} outgoing, z={:.2})", record.out_degree, z));
        }

        match record.node_type {
            NodeType::Alert => {
                score += weights.alert_boost;
                reasons.push("Alert node".to_string());
            }
            NodeType::Attacker => {
                score += weights.attacker_boost;
                reasons.push("Known attacker".to_string());
            }
            NodeType::Attack => {
                score += weights.attack_boost;
                reasons.push("Attack activity".to_string());
            }
            NodeType::Service => {
                let errors = model.incident_edges(idx).filter(|e| e.is_error()).count();
                if errors > 0 {
                    score += weights.service_error_boost * errors as f64;
                    reasons.push(format!("Service errors detected ({} error responses)", errors));
                }
            }
            NodeType::Resource => {
                let interactions = model.incident_edges(idx).count();
                if !out_stats.flat && interactions as f64 > out_threshold {
                    score += weights.excessive_interaction_boost;
                    reasons.push(format!("Excessive interactions ({})", interactions));
                }
            }
            _ => {}
        }

        record.anomaly_score = score;
        record.reasons = reasons;
        scores.push(score);
    }

    let stats = DistributionStats::from_values(&scores);
    let threshold = stats.threshold(k);

    let mut anomalies: Vec<Anomaly> = features
        .iter()
        .filter(|r| stats.exceeds(r.anomaly_score, k))
        .map(|r| Anomaly {
            node_id: r.id.clone(),
            score: r.anomaly_score,
            reasons: r.reasons.clone(),
            node_type: r.node_type,
        })
        .collect();
    anomalies.sort_by(|a, b| b.score.total_cmp(&a.score));

    AnomalyOutcome {
        anomalies,
        threshold,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeInput, NodeInput};

    fn run(nodes: &[NodeInput], edges: &[EdgeInput], config: &AnalysisConfig) -> (AnomalyOutcome, FeatureStore) {
        let model = GraphModel::build(nodes, edges);
        let mut features = model.init_features();
        let outcome = detect_anomalies(&model, &mut features, config);
        (outcome, features)
    }

    #[test]
    fn test_stats_population_std() {
        let stats = DistributionStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std_dev, 2.0);
        assert_eq!(stats.threshold(1.5), 8.0);
        assert!(stats.exceeds(9.0, 1.5));
        assert!(!stats.exceeds(8.0, 1.5));
    }

    #[test]
    fn test_flat_distribution_never_exceeds() {
        let stats = DistributionStats::from_values(&[0.1 + 0.2; 7]);
        assert!(stats.flat);
        assert_eq!(stats.z_score(0.3), 0.0);
        assert!(!stats.exceeds(0.30000000000000004, 0.0));
        assert!(DistributionStats::from_values(&[]).flat);
    }

    #[test]
    fn test_zero_variance_yields_no_anomalies() {
        // A directed cycle: every degree and every score is identical
        let edges = vec![
            EdgeInput::new("n1", "n2"),
            EdgeInput::new("n2", "n3"),
            EdgeInput::new("n3", "n1"),
        ];
        let (outcome, features) = run(&[], &edges, &AnalysisConfig::default());
        assert!(outcome.anomalies.is_empty());
        assert!(features.iter().all(|r| r.anomaly_score == 0.0));

        let alerts = vec![NodeInput::new("alert-1"), NodeInput::new("alert-2")];
        let (outcome, _) = run(&alerts, &[], &AnalysisConfig::default());
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn test_service_error_contribution() {
        let nodes = vec![NodeInput::new("service-pay"), NodeInput::new("user1"), NodeInput::new("user2")];
        let edges = vec![
            EdgeInput::new("user1", "service-pay").with_type("HTTP_500"),
            EdgeInput::new("user2", "service-pay").with_type("http_500"),
            EdgeInput::new("user1", "server1").with_type("HTTP_200"),
        ];
        let (_, features) = run(&nodes, &edges, &AnalysisConfig::default());

        let service = features.get("service-pay").unwrap();
        assert!(service.anomaly_score >= 0.8 - 1e-12);
        assert!(service
            .reasons
            .iter()
            .any(|r| r == "Service errors detected (2 error responses)"));
    }

    #[test]
    fn test_attacker_flagged_and_sorted() {
        let nodes = vec![
            NodeInput::new("user1"),
            NodeInput::new("server1"),
            NodeInput::new("service1"),
            NodeInput::new("attacker1"),
        ];
        let edges = vec![
            EdgeInput::new("user1", "service1"),
            EdgeInput::new("service1", "server1"),
            EdgeInput::new("attacker1", "server1").with_weight(2.0),
            EdgeInput::new("attacker1", "service1"),
        ];
        let (outcome, features) = run(&nodes, &edges, &AnalysisConfig::default());

        assert_eq!(outcome.anomalies.len(), 1);
        let top = &outcome.anomalies[0];
        assert_eq!(top.node_id, "attacker1");
        assert_eq!(top.node_type, NodeType::Attacker);
        assert_eq!(top.reasons, vec!["Known attacker".to_string()]);
        assert!(top.score > outcome.threshold);
        assert_eq!(features.get("user1").unwrap().anomaly_score, 0.0);
    }

    #[test]
    fn test_high_in_degree_signal() {
        let mut edges: Vec<EdgeInput> = (0..8)
            .map(|i| EdgeInput::new(format!("user{}", i), "server-hub"))
            .collect();
        edges.push(EdgeInput::new("user0", "user1"));
        let (outcome, features) = run(&[], &edges, &AnalysisConfig::default());

        let hub = features.get("server-hub").unwrap();
        assert!(hub.anomaly_score > 0.0);
        assert!(hub.reasons[0].starts_with("High in-degree (8 incoming"));
        assert_eq!(outcome.anomalies[0].node_id, "server-hub");
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let mut nodes = vec![NodeInput::new("zeta-attack"), NodeInput::new("alpha-attack")];
        nodes.extend((0..10).map(|i| NodeInput::new(format!("user{}", i))));
        let (outcome, _) = run(&nodes, &[], &AnalysisConfig::default());

        let ids: Vec<&str> = outcome.anomalies.iter().map(|a| a.node_id.as_str()).collect();
        assert_eq!(ids, vec!["zeta-attack", "alpha-attack"]);
        assert_eq!(outcome.anomalies[0].score, outcome.anomalies[1].score);
    }

    #[test]
    fn test_excessive_resource_interactions() {
        // out-degrees [2, 1, 1, 1, 1, 1, 1, 0]: mean 1, std 0.5, threshold 1.75
        let mut edges: Vec<EdgeInput> = (0..6)
            .map(|i| EdgeInput::new(format!("user{}", i), "bucket-logs"))
            .collect();
        edges.push(EdgeInput::new("bucket-logs", "user0"));
        edges.push(EdgeInput::new("user0", "server1"));
        let (_, features) = run(&[], &edges, &AnalysisConfig::default());

        let bucket = features.get("bucket-logs").unwrap();
        assert_eq!(bucket.node_type, NodeType::Resource);
        assert!(bucket.reasons.iter().any(|r| r == "Excessive interactions (7)"));
    }

    #[test]
    fn test_uniform_ring_resource_not_flagged() {
        let ids: Vec<String> = (0..10)
            .map(|i| if i == 4 { "bucket-1".to_string() } else { format!("n{}", i) })
            .collect();
        let edges: Vec<EdgeInput> = (0..10)
            .map(|i| EdgeInput::new(ids[i].clone(), ids[(i + 1) % 10].clone()))
            .collect();
        let (outcome, features) = run(&[], &edges, &AnalysisConfig::default());

        let bucket = features.get("bucket-1").unwrap();
        assert_eq!(bucket.node_type, NodeType::Resource);
        assert!(bucket.reasons.is_empty());
        assert_eq!(bucket.anomaly_score, 0.0);
        assert!(outcome.anomalies.is_empty());
    }
}
