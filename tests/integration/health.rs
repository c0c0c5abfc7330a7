//! Health endpoint integration tests
//!
//! The health endpoints must report static configuration only and never
//! reach out to Vertex AI.

use serde_json::Value;

use crate::common::{constants, TestHarness};

#[tokio::test]
async fn test_root_banner() {
    let harness = TestHarness::new().await;
    harness.expect_no_vertex_calls().await;

    let response = harness.server.get("/").await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "/chat"));
}

#[tokio::test]
async fn test_health_returns_static_config_without_outbound_calls() {
    let harness = TestHarness::new().await;
    harness.expect_no_vertex_calls().await;

    let response = harness.server.get("/health").await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_endpoint"], constants::TEST_ENDPOINT);
    assert_eq!(json["environment"], "local");

    let version = json["backend_version"].as_str().unwrap();
    assert!(version.contains('.'), "Version should be in semver format");

    let uptime = json["uptime_seconds"].as_u64().unwrap();
    let _ = uptime;

    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_probe_endpoints() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health/ready").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");

    let response = harness.server.get("/health/live").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}
