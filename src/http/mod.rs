//! HTTP API
//!
//! - `POST /api/analyze` with `{nodes, edges, config?}` returns the report
//! - `GET /api/status` returns health and version

pub mod handler;
pub mod server;

pub use handler::AnalyzeRequest;
pub use server::{router, HttpServer};
