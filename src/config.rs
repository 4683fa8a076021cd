//! Analysis configuration
//!
//! Loaded from YAML (or JSON, which YAML accepts) with camelCase keys:
//!
//! ```yaml
//! anomalyThreshold: 1.5
//! pageRankIterations: 20
//! pageRankDamping: 0.85
//! convergenceThreshold: 0.000001
//! detector:
//!   attackBoost: 1.0
//! dreadWeights:
//!   damage: 2.0
//! deadlineMs: 5000
//! ```

use crate::algo::{DanglingPolicy, PageRankConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default multiplier k for `mean + k * stddev` thresholds
pub const DEFAULT_ANOMALY_K: f64 = 1.5;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Signal weights for the anomaly detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Multiplier applied to degree z-scores
    pub degree_weight: f64,
    pub alert_boost: f64,
    pub attacker_boost: f64,
    pub attack_boost: f64,
    /// Added once per error-tagged edge touching a SERVICE node
    pub service_error_boost: f64,
    /// RESOURCE nodes with more incident edges than the out-degree threshold
    pub excessive_interaction_boost: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            degree_weight: 1.0,
            alert_boost: 0.5,
            attacker_boost: 0.8,
            attack_boost: 1.0,
            service_error_boost: 0.4,
            excessive_interaction_boost: 0.6,
        }
    }
}

/// Per-factor weights for the DREAD sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DreadWeights {
    pub damage: f64,
    pub reproducibility: f64,
    pub exploitability: f64,
    pub affected_users: f64,
    pub discoverability: f64,
}

impl Default for DreadWeights {
    fn default() -> Self {
        Self {
            damage: 1.0,
            reproducibility: 1.0,
            exploitability: 1.0,
            affected_users: 1.0,
            discoverability: 1.0,
        }
    }
}

/// Top-level analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// k in `mean + k * stddev`, shared by the degree and score thresholds
    pub anomaly_threshold: f64,
    pub page_rank_iterations: usize,
    pub page_rank_damping: f64,
    pub convergence_threshold: f64,
    /// Spread rank of nodes without out-edges uniformly instead of dropping it
    pub redistribute_dangling_rank: bool,
    pub detector: DetectorConfig,
    pub dread_weights: DreadWeights,
    /// Wall-clock budget for one analysis run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: DEFAULT_ANOMALY_K,
            page_rank_iterations: 20,
            page_rank_damping: 0.85,
            convergence_threshold: 1e-6,
            redistribute_dangling_rank: true,
            detector: DetectorConfig::default(),
            dread_weights: DreadWeights::default(),
            deadline_ms: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.page_rank_damping) {
            return Err(ConfigError::Invalid(format!(
                "pageRankDamping must be within [0, 1], got {}",
                self.page_rank_damping
            )));
        }
        if self.page_rank_iterations == 0 {
            return Err(ConfigError::Invalid("pageRankIterations must be at least 1".into()));
        }
        if !is_finite_non_negative(self.convergence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "convergenceThreshold must be a finite non-negative number, got {}",
                self.convergence_threshold
            )));
        }
        if !is_finite_non_negative(self.anomaly_threshold) {
            return Err(ConfigError::Invalid(format!(
                "anomalyThreshold must be a finite non-negative number, got {}",
                self.anomaly_threshold
            )));
        }

        let d = &self.detector;
        let boosts = [
            ("degreeWeight", d.degree_weight),
            ("alertBoost", d.alert_boost),
            ("attackerBoost", d.attacker_boost),
            ("attackBoost", d.attack_boost),
            ("serviceErrorBoost", d.service_error_boost),
            ("excessiveInteractionBoost", d.excessive_interaction_boost),
        ];
        for (name, value) in boosts {
            if !is_finite_non_negative(value) {
                return Err(ConfigError::Invalid(format!(
                    "detector.{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    pub fn page_rank_config(&self) -> PageRankConfig {
        PageRankConfig {
            damping_factor: self.page_rank_damping,
            iterations: self.page_rank_iterations,
            tolerance: self.convergence_threshold,
            dangling: if self.redistribute_dangling_rank {
                DanglingPolicy::Redistribute
            } else {
                DanglingPolicy::Drop
            },
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

fn is_finite_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
