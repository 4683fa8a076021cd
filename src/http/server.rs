//! HTTP server exposing the analysis API

use super::handler::{analyze_handler, status_handler};
use crate::config::AnalysisConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the API router; each request gets its own analysis run
pub fn router(config: AnalysisConfig) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(config))
}

/// HTTP server for the analysis API
pub struct HttpServer {
    config: AnalysisConfig,
    port: u16,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: AnalysisConfig, port: u16) -> Self {
        Self { config, port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Start the HTTP server
    pub async fn start(&self) -> std::io::Result<()> {
        let app = router(self.config.clone());

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Analysis API listening on http://localhost:{}", self.port);

        axum::serve(listener, app).await
    }
}
