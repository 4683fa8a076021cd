//! Analysis pipeline
//!
//! [`Analyzer`] runs the fixed stage sequence over one graph snapshot:
//! model, all-pairs shortest paths, PageRank, betweenness, clustering,
//! anomaly detection, DREAD scoring, threat paths and breakdowns. Every stage
//! finishes for all nodes before the next one reads its output.

pub mod anomaly;
pub mod breakdown;
pub mod dread;
pub mod report;
pub mod threat;

pub use anomaly::{detect_anomalies, Anomaly, AnomalyOutcome, DistributionStats};
pub use breakdown::{
    AttackSummary, HealthStatus, ServerHealth, ServiceCommunication, SystemHealth, UserBehavior,
};
pub use dread::{AttributeFactor, DreadScorer, MaxValues, NodeContext, RiskFactor};
pub use report::{AnalysisReport, Overview, PathTable};
pub use threat::{path_risk_score, reconstruct_threat_paths, type_risk, ThreatPath};

use crate::algo;
use crate::config::{AnalysisConfig, ConfigError};
use crate::graph::{EdgeInput, GraphInput, GraphModel, NodeInput};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors produced by an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No node ids at all, neither explicit nor from edge endpoints
    #[error("Analysis failed: graph has no nodes")]
    EmptyGraph,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Deadline exceeded during {stage}")]
    DeadlineExceeded { stage: &'static str },
}

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(msg) => AnalysisError::InvalidConfig(msg),
            other => AnalysisError::InvalidConfig(other.to_string()),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Wall-clock limit for one run; `none()` never expires
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Deadline { at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Deadline {
            at: Instant::now().checked_add(budget),
        }
    }

    pub fn at(instant: Instant) -> Self {
        Deadline { at: Some(instant) }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` naming the stage about to start
    pub fn check(&self, stage: &'static str) -> AnalysisResult<()> {
        if self.is_expired() {
            warn!("Analysis deadline exceeded before {}", stage);
            return Err(AnalysisError::DeadlineExceeded { stage });
        }
        Ok(())
    }
}

/// Stateless analysis engine; every call builds its own model and features
pub struct Analyzer {
    config: AnalysisConfig,
    scorer: DreadScorer,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let scorer = DreadScorer::new(&config.dread_weights);
        Self { config, scorer }
    }

    /// Replace the DREAD scorer, e.g. one extended with custom factors
    pub fn with_scorer(mut self, scorer: DreadScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_input(&self, input: &GraphInput) -> AnalysisResult<AnalysisReport> {
        self.analyze(&input.nodes, &input.edges)
    }

    /// Run the full pipeline, honouring `deadlineMs` from the configuration
    pub fn analyze(&self, nodes: &[NodeInput], edges: &[EdgeInput]) -> AnalysisResult<AnalysisReport> {
        let deadline = match self.config.deadline() {
            Some(budget) => Deadline::after(budget),
            None => Deadline::none(),
        };
        self.analyze_with_deadline(nodes, edges, deadline)
    }

    pub fn analyze_with_deadline(
        &self,
        nodes: &[NodeInput],
        edges: &[EdgeInput],
        deadline: Deadline,
    ) -> AnalysisResult<AnalysisReport> {
        self.config.validate()?;
        info!("Starting analysis: {} nodes, {} edges", nodes.len(), edges.len());
        let started = Instant::now();

        let model = GraphModel::build(nodes, edges);
        if model.is_empty() {
            warn!("Analysis requested for an empty graph");
            return Err(AnalysisError::EmptyGraph);
        }
        let view = algo::build_view(&model);
        let mut features = model.init_features();
        debug!("Model built: {} ids, {} structural edges", model.node_count(), view.edge_count());

        deadline.check("shortest_paths")?;
        let trees = algo::shortest_path_table(&view, &deadline)?;

        deadline.check("page_rank")?;
        let page_rank =
            algo::apply_page_rank(&view, &mut features, self.config.page_rank_config(), &deadline)?;
        if !page_rank.converged {
            debug!("PageRank stopped at the iteration cap ({})", page_rank.iterations);
        }

        deadline.check("betweenness")?;
        algo::apply_betweenness(&trees, &mut features);

        deadline.check("clustering")?;
        algo::apply_clustering(&view, &mut features);

        deadline.check("anomaly_detection")?;
        let outcome = detect_anomalies(&model, &mut features, &self.config);
        debug!(
            "Anomaly threshold {:.4} (mean {:.4}, std {:.4}): {} anomalies",
            outcome.threshold,
            outcome.stats.mean,
            outcome.stats.std_dev,
            outcome.anomalies.len()
        );

        deadline.check("dread")?;
        self.scorer.score_all(&model, &mut features);

        deadline.check("threat_paths")?;
        let threat_paths = reconstruct_threat_paths(&outcome.anomalies, &model, &features, &trees);
        debug!("Reconstructed {} threat paths", threat_paths.len());

        deadline.check("report")?;
        let report = AnalysisReport::assemble(&model, &features, &trees, outcome, threat_paths, &page_rank);

        info!(
            "Analysis complete in {:?}: {} anomalies, {} threat paths",
            started.elapsed(),
            report.anomalies.len(),
            report.threat_paths.len()
        );
        Ok(report)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
