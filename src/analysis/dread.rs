//! DREAD risk scoring
//!
//! The score is the weighted sum of independent [`RiskFactor`]s. The five
//! standard factors read numeric node attributes and default to 1; custom
//! factors can be pushed onto a [`DreadScorer`] without changing how the sum
//! is formed.

use crate::config::DreadWeights;
use crate::graph::{FeatureRecord, FeatureStore, GraphModel, ResolvedNode};
use tracing::debug;

/// Graph-wide maxima used to normalise structural factors, each at least 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxValues {
    pub in_degree: f64,
    pub out_degree: f64,
    pub total_degree: f64,
    pub betweenness: f64,
    pub page_rank: f64,
}

impl Default for MaxValues {
    fn default() -> Self {
        MaxValues {
            in_degree: 1.0,
            out_degree: 1.0,
            total_degree: 1.0,
            betweenness: 1.0,
            page_rank: 1.0,
        }
    }
}

impl MaxValues {
    pub fn from_features(features: &FeatureStore) -> Self {
        features.iter().fold(MaxValues::default(), |max, r| MaxValues {
            in_degree: max.in_degree.max(r.in_degree as f64),
            out_degree: max.out_degree.max(r.out_degree as f64),
            total_degree: max.total_degree.max(r.total_degree as f64),
            betweenness: max.betweenness.max(r.betweenness_centrality),
            page_rank: max.page_rank.max(r.page_rank),
        })
    }
}

/// Everything a factor may look at for one node
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    pub node: &'a ResolvedNode,
    pub features: &'a FeatureRecord,
    pub max: &'a MaxValues,
}

/// One term of the DREAD sum
pub trait RiskFactor: Send + Sync {
    fn name(&self) -> &str;

    /// Unweighted factor value for the node
    fn score(&self, ctx: &NodeContext<'_>) -> f64;
}

/// Factor read from a node attribute, 1 when the attribute is missing or
/// not numeric
#[derive(Debug, Clone)]
pub struct AttributeFactor {
    name: &'static str,
    keys: &'static [&'static str],
}

impl AttributeFactor {
    pub const fn new(name: &'static str, keys: &'static [&'static str]) -> Self {
        AttributeFactor { name, keys }
    }

    pub const fn damage() -> Self {
        Self::new("damage", &["damage"])
    }

    pub const fn reproducibility() -> Self {
        Self::new("reproducibility", &["reproducibility"])
    }

    pub const fn exploitability() -> Self {
        Self::new("exploitability", &["exploitability"])
    }

    pub const fn affected_users() -> Self {
        Self::new("affectedUsers", &["affectedUsers", "affected_users"])
    }

    pub const fn discoverability() -> Self {
        Self::new("discoverability", &["discoverability"])
    }
}

impl RiskFactor for AttributeFactor {
    fn name(&self) -> &str {
        self.name
    }

    fn score(&self, ctx: &NodeContext<'_>) -> f64 {
        for key in self.keys {
            let Some(value) = ctx.node.attributes.get(*key) else {
                continue;
            };
            match value.as_float().filter(|v| v.is_finite()) {
                Some(v) => return v,
                None => debug!(
                    node = %ctx.node.id,
                    key,
                    ?value,
                    "non-numeric DREAD attribute, using 1"
                ),
            }
        }
        1.0
    }
}

struct WeightedFactor {
    factor: Box<dyn RiskFactor>,
    weight: f64,
}

/// Weighted sum over risk factors
pub struct DreadScorer {
    factors: Vec<WeightedFactor>,
}

impl DreadScorer {
    /// The five standard DREAD factors with the given weights
    pub fn new(weights: &DreadWeights) -> Self {
        Self { factors: Vec::new() }
            .with_factor(AttributeFactor::damage(), weights.damage)
            .with_factor(AttributeFactor::reproducibility(), weights.reproducibility)
            .with_factor(AttributeFactor::exploitability(), weights.exploitability)
            .with_factor(AttributeFactor::affected_users(), weights.affected_users)
            .with_factor(AttributeFactor::discoverability(), weights.discoverability)
    }

    pub fn with_factor(mut self, factor: impl RiskFactor + 'static, weight: f64) -> Self {
        self.push_factor(Box::new(factor), weight);
        self
    }

    pub fn push_factor(&mut self, factor: Box<dyn RiskFactor>, weight: f64) {
        self.factors.push(WeightedFactor { factor, weight });
    }

    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.factor.name()).collect()
    }

    pub fn score(&self, ctx: &NodeContext<'_>) -> f64 {
        self.factors
            .iter()
            .map(|f| f.weight * f.factor.score(ctx))
            .sum()
    }

    /// Score every node and store the result in its feature record
    pub fn score_all(&self, model: &GraphModel, features: &mut FeatureStore) {
        let max = MaxValues::from_features(features);
        let scores: Vec<f64> = model
            .nodes()
            .iter()
            .zip(features.iter())
            .map(|(node, record)| {
                self.score(&NodeContext {
                    node,
                    features: record,
                    max: &max,
                })
            })
            .collect();
        features.assign(&scores, |record, score| record.dread_score = score);
    }
}

impl Default for DreadScorer {
    fn default() -> Self {
        Self::new(&DreadWeights::default())
    }
}

impl std::fmt::Debug for DreadScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DreadScorer")
            .field("factors", &self.factor_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeInput, GraphInput, NodeInput};

    struct CentralityFactor;

    impl RiskFactor for CentralityFactor {
        fn name(&self) -> &str {
            "centrality"
        }

        fn score(&self, ctx: &NodeContext<'_>) -> f64 {
            ctx.features.total_degree as f64 / ctx.max.total_degree
        }
    }

    #[test]
    fn test_default_score_is_five() {
        let model = GraphModel::build(&[NodeInput::new("user1")], &[]);
        let mut features = model.init_features();
        DreadScorer::default().score_all(&model, &mut features);
        assert_eq!(features.get("user1").unwrap().dread_score, 5.0);
    }

    #[test]
    fn test_attributes_and_weights() {
        let nodes = vec![NodeInput::new("db-main")
            .with_attribute("damage", 8.0)
            .with_attribute("affected_users", 3i64)
            .with_attribute("discoverability", "2.5")
            .with_attribute("reproducibility", "often")];
        let model = GraphModel::build(&nodes, &[]);
        let mut features = model.init_features();

        let weights = DreadWeights {
            damage: 2.0,
            ..DreadWeights::default()
        };
        DreadScorer::new(&weights).score_all(&model, &mut features);

        // 2*8 + 1 (non-numeric) + 1 (missing) + 3 + 2.5
        assert_eq!(features.get("db-main").unwrap().dread_score, 23.5);
    }

    #[test]
    fn test_camel_case_key_takes_precedence() {
        let nodes = vec![NodeInput::new("x")
            .with_attribute("affectedUsers", 4.0)
            .with_attribute("affected_users", 9.0)];
        let model = GraphModel::build(&nodes, &[]);
        let features = model.init_features();
        let max = MaxValues::from_features(&features);
        let ctx = NodeContext {
            node: model.node(0),
            features: features.by_index(0).unwrap(),
            max: &max,
        };
        assert_eq!(AttributeFactor::affected_users().score(&ctx), 4.0);
    }

    #[test]
    fn test_non_numeric_attribute_falls_back() {
        let input = GraphInput::from_json_str(
            r#"{"nodes": [{"id": "x", "affectedUsers": ["ops", "dev"], "affected_users": 6, "damage": true}]}"#,
        )
        .unwrap();
        let model = GraphModel::build(&input.nodes, &[]);
        let features = model.init_features();
        let max = MaxValues::from_features(&features);
        let ctx = NodeContext {
            node: model.node(0),
            features: features.by_index(0).unwrap(),
            max: &max,
        };

        assert_eq!(AttributeFactor::affected_users().score(&ctx), 6.0);
        assert_eq!(AttributeFactor::damage().score(&ctx), 1.0);
    }

    #[test]
    fn test_custom_factor_extends_sum() {
        let edges = vec![EdgeInput::new("a", "b"), EdgeInput::new("a", "c")];
        let model = GraphModel::build(&[], &edges);
        let mut features = model.init_features();

        let scorer = DreadScorer::default().with_factor(CentralityFactor, 2.0);
        assert_eq!(scorer.factor_names().len(), 6);
        scorer.score_all(&model, &mut features);

        assert_eq!(features.get("a").unwrap().dread_score, 7.0);
        assert_eq!(features.get("b").unwrap().dread_score, 6.0);
    }

    #[test]
    fn test_max_values_floor_at_one() {
        let model = GraphModel::build(&[NodeInput::new("solo")], &[]);
        let features = model.init_features();
        assert_eq!(MaxValues::from_features(&features), MaxValues::default());
    }
}
