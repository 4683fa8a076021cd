//! Per-category summaries derived from the finished feature store

use crate::graph::{FeatureRecord, FeatureStore, GraphModel, NodeType};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Anomaly score above which a user or server is considered risky
const RISK_ANOMALY_LIMIT: f64 = 1.0;
/// DREAD score above which a server is considered risky
const RISK_DREAD_LIMIT: f64 = 7.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehavior {
    /// Outgoing edges, parallel edges included
    pub total_actions: usize,
    pub unique_targets: usize,
    pub anomaly_score: f64,
    pub dread_score: f64,
    pub is_suspicious: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCommunication {
    pub incoming_calls: usize,
    pub outgoing_calls: usize,
    pub error_responses: usize,
    pub success_responses: usize,
    pub retry_attempts: usize,
    /// 1 - errors / incident calls; 1 when there are no calls
    pub reliability: f64,
    pub anomaly_score: f64,
    pub dread_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealth {
    pub status: HealthStatus,
    pub alert_count: usize,
    pub alert_ids: Vec<String>,
    pub anomaly_score: f64,
    pub dread_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub total_servers: usize,
    pub total_alerts: usize,
    pub high_risk_servers: usize,
    pub servers: IndexMap<String, ServerHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackSummary {
    pub related_edges: usize,
    pub anomaly_score: f64,
    pub dread_score: f64,
    pub betweenness_centrality: f64,
}

fn records_of(
    features: &FeatureStore,
    wanted: impl Fn(NodeType) -> bool,
) -> impl Iterator<Item = (usize, &FeatureRecord)> {
    features
        .iter()
        .enumerate()
        .filter(move |(_, r)| wanted(r.node_type))
}

fn is_high_risk(record: &FeatureRecord) -> bool {
    record.anomaly_score > RISK_ANOMALY_LIMIT || record.dread_score > RISK_DREAD_LIMIT
}

pub fn user_behavior(model: &GraphModel, features: &FeatureStore) -> IndexMap<String, UserBehavior> {
    records_of(features, |t| t == NodeType::User)
        .map(|(idx, record)| {
            let mut total_actions = 0;
            let mut targets = IndexSet::new();
            for (_, s, t) in model.indexed_edges() {
                if s == idx {
                    total_actions += 1;
                    targets.insert(t);
                }
            }

            let summary = UserBehavior {
                total_actions,
                unique_targets: targets.len(),
                anomaly_score: record.anomaly_score,
                dread_score: record.dread_score,
                is_suspicious: record.anomaly_score > RISK_ANOMALY_LIMIT,
            };
            (record.id.clone(), summary)
        })
        .collect()
}

pub fn service_communication(
    model: &GraphModel,
    features: &FeatureStore,
) -> IndexMap<String, ServiceCommunication> {
    records_of(features, |t| t == NodeType::Service)
        .map(|(idx, record)| {
            let incoming_calls = model.indexed_edges().filter(|&(_, _, t)| t == idx).count();
            let outgoing_calls = model.indexed_edges().filter(|&(_, s, _)| s == idx).count();

            let mut incident = 0;
            let mut error_responses = 0;
            let mut success_responses = 0;
            let mut retry_attempts = 0;
            for edge in model.incident_edges(idx) {
                incident += 1;
                if edge.is_error() {
                    error_responses += 1;
                }
                if edge.is_success() {
                    success_responses += 1;
                }
                if edge.is_retry() {
                    retry_attempts += 1;
                }
            }

            let reliability = if incident == 0 {
                1.0
            } else {
                1.0 - error_responses as f64 / incident as f64
            };

            let summary = ServiceCommunication {
                incoming_calls,
                outgoing_calls,
                error_responses,
                success_responses,
                retry_attempts,
                reliability,
                anomaly_score: record.anomaly_score,
                dread_score: record.dread_score,
            };
            (record.id.clone(), summary)
        })
        .collect()
}

pub fn system_health(model: &GraphModel, features: &FeatureStore) -> SystemHealth {
    let total_alerts = records_of(features, |t| t == NodeType::Alert).count();

    let mut health = SystemHealth {
        total_alerts,
        ..SystemHealth::default()
    };

    for (idx, record) in records_of(features, |t| t == NodeType::Server) {
        health.total_servers += 1;
        let high_risk = is_high_risk(record);
        if high_risk {
            health.high_risk_servers += 1;
        }

        let mut alert_ids: IndexSet<&str> = IndexSet::new();
        for (_, s, t) in model.indexed_edges() {
            let other = if s == idx {
                t
            } else if t == idx {
                s
            } else {
                continue;
            };
            if model.node(other).node_type == NodeType::Alert {
                alert_ids.insert(model.id(other));
            }
        }

        let status = if !alert_ids.is_empty() || high_risk {
            HealthStatus::Critical
        } else if record.anomaly_score > 0.0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        };

        health.servers.insert(
            record.id.clone(),
            ServerHealth {
                status,
                alert_count: alert_ids.len(),
                alert_ids: alert_ids.into_iter().map(str::to_string).collect(),
                anomaly_score: record.anomaly_score,
                dread_score: record.dread_score,
            },
        );
    }

    health
}

pub fn attack_summary(model: &GraphModel, features: &FeatureStore) -> IndexMap<String, AttackSummary> {
    records_of(features, |t| t.is_hostile())
        .map(|(idx, record)| {
            let summary = AttackSummary {
                related_edges: model.incident_edges(idx).count(),
                anomaly_score: record.anomaly_score,
                dread_score: record.dread_score,
                betweenness_centrality: record.betweenness_centrality,
            };
            (record.id.clone(), summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeInput, NodeInput};

    fn model() -> GraphModel {
        let nodes = vec![NodeInput::new("user1"), NodeInput::new("service-auth")];
        let edges = vec![
            EdgeInput::new("user1", "service-auth").with_type("HTTP_200"),
            EdgeInput::new("user1", "service-auth").with_type("HTTP_500"),
            EdgeInput::new("user1", "server1"),
            EdgeInput::new("service-auth", "server1").with_type("RETRY"),
            EdgeInput::new("alert-cpu", "server1"),
            EdgeInput::new("attacker1", "server2"),
        ];
        GraphModel::build(&nodes, &edges)
    }

    #[test]
    fn test_user_behavior() {
        let model = model();
        let features = model.init_features();
        let users = user_behavior(&model, &features);

        let user = &users["user1"];
        assert_eq!(user.total_actions, 3);
        assert_eq!(user.unique_targets, 2);
        assert!(!user.is_suspicious);
    }

    #[test]
    fn test_service_communication() {
        let model = model();
        let features = model.init_features();
        let services = service_communication(&model, &features);

        let auth = &services["service-auth"];
        assert_eq!(auth.incoming_calls, 2);
        assert_eq!(auth.outgoing_calls, 1);
        assert_eq!(auth.error_responses, 1);
        assert_eq!(auth.success_responses, 1);
        assert_eq!(auth.retry_attempts, 1);
        assert!((auth.reliability - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_system_health_statuses() {
        let model = model();
        let mut features = model.init_features();
        let server2 = features.index_of("server2").unwrap();
        features.by_index_mut(server2).unwrap().anomaly_score = 0.3;

        let health = system_health(&model, &features);
        assert_eq!(health.total_servers, 2);
        assert_eq!(health.total_alerts, 1);
        assert_eq!(health.high_risk_servers, 0);

        let server1 = &health.servers["server1"];
        assert_eq!(server1.status, HealthStatus::Critical);
        assert_eq!(server1.alert_ids, vec!["alert-cpu".to_string()]);
        assert_eq!(health.servers["server2"].status, HealthStatus::Warning);
    }

    #[test]
    fn test_high_risk_server_by_dread() {
        let model = GraphModel::build(&[NodeInput::new("server9")], &[]);
        let mut features = model.init_features();
        features.by_index_mut(0).unwrap().dread_score = 7.5;

        let health = system_health(&model, &features);
        assert_eq!(health.high_risk_servers, 1);
        assert_eq!(health.servers["server9"].status, HealthStatus::Critical);
    }

    #[test]
    fn test_attack_summary() {
        let model = model();
        let features = model.init_features();
        let attacks = attack_summary(&model, &features);

        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks["attacker1"].related_edges, 1);
    }
}
