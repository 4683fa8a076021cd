use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use threatgraph::http::router;
use threatgraph::AnalysisConfig;
use tower::ServiceExt;

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = router(AnalysisConfig::default()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn analyze_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_status_endpoint() {
    let request = Request::builder().uri("/api/status").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], threatgraph::VERSION);
    assert_eq!(body["config"]["anomalyThreshold"], 1.5);
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let (status, body) = send(analyze_request(json!({
        "nodes": [{"id": "user1"}, {"id": "attacker1", "criticality": 1}],
        "edges": [
            {"source": "user1", "target": "service1"},
            {"source": "attacker1", "target": "server1", "weight": 2}
        ]
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overview"]["totalNodes"], 4);
    assert_eq!(body["overview"]["totalEdges"], 2);
    assert_eq!(body["nodeFeatures"]["attacker1"]["type"], "ATTACKER");
    assert_eq!(body["nodeFeatures"]["attacker1"]["criticality"], 1.0);
    assert!(body["shortestPaths"]["user1"]["distances"]["server1"].is_null());
    assert!(body["threatPaths"].is_array());
}

#[tokio::test]
async fn test_analyze_with_request_config() {
    let (status, body) = send(analyze_request(json!({
        "nodes": [{"id": "service1", "damage": 4}],
        "edges": [],
        "config": {"dreadWeights": {"damage": 0.5}}
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodeFeatures"]["service1"]["dreadScore"], 6.0);
}

#[tokio::test]
async fn test_empty_graph_is_bad_request() {
    let (status, body) = send(analyze_request(json!({"nodes": [], "edges": []}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("no nodes"));
}

#[tokio::test]
async fn test_invalid_config_is_bad_request() {
    let (status, body) = send(analyze_request(json!({
        "nodes": [{"id": "user1"}],
        "config": {"pageRankIterations": 0}
    })))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pageRankIterations"));
}

#[tokio::test]
async fn test_deadline_maps_to_timeout() {
    let (status, _) = send(analyze_request(json!({
        "nodes": [{"id": "user1"}],
        "config": {"deadlineMs": 0}
    })))
    .await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}
