//! HTTP handlers for the analysis API

use crate::analysis::{AnalysisError, Analyzer};
use crate::config::AnalysisConfig;
use crate::graph::{EdgeInput, NodeInput};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request body for `POST /api/analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    /// Overrides the server configuration for this request only
    pub config: Option<AnalysisConfig>,
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

/// Handler for graph analysis
pub async fn analyze_handler(
    State(config): State<Arc<AnalysisConfig>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    let config = payload.config.unwrap_or_else(|| (*config).clone());
    let (nodes, edges) = (payload.nodes, payload.edges);
    debug!("Analyze request: {} nodes, {} edges", nodes.len(), edges.len());

    let result =
        tokio::task::spawn_blocking(move || Analyzer::new(config).analyze(&nodes, &edges)).await;

    match result {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(e @ AnalysisError::DeadlineExceeded { .. })) => {
            warn!("Analysis aborted: {}", e);
            error_response(StatusCode::REQUEST_TIMEOUT, e)
        }
        Ok(Err(e)) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e) => {
            warn!("Analysis task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
        }
    }
}

/// Handler for system status
pub async fn status_handler(State(config): State<Arc<AnalysisConfig>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "config": {
            "anomalyThreshold": config.anomaly_threshold,
            "pageRankIterations": config.page_rank_iterations,
            "deadlineMs": config.deadline_ms,
        }
    }))
}
