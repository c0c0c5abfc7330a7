//! Chat endpoint integration tests
//!
//! Covers request validation, the primary/fallback strategy as observed
//! through the HTTP surface, and the chat-with-image path.

use axum::http::StatusCode;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{constants, model_response, primary_path, test_data, TestHarness};

#[tokio::test]
async fn test_empty_message_rejected_before_any_upstream_call() {
    let harness = TestHarness::new().await;
    harness.expect_no_vertex_calls().await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::empty_chat_request())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_chat_served_by_primary_endpoint() {
    let harness = TestHarness::new().await;
    harness
        .mock_primary_success("Penang is famous for char kway teow and assam laksa!")
        .await;
    harness.mock_fallback("unused", 0).await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::valid_chat_request())
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert!(!json["response"].as_str().unwrap().is_empty());
    assert_eq!(json["model_used"], constants::TEST_PRIMARY_MODEL_USED);
    // First turn of a session is always the greeting phase
    assert_eq!(json["phase"], "greeting");
}

#[tokio::test]
async fn test_primary_permission_error_falls_back_once() {
    let harness = TestHarness::new().await;
    harness.mock_primary_failure(403).await;
    harness.mock_fallback("Fallback knows Penang too", 1).await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::valid_chat_request())
        .await;

    // Still a 200; the client only learns which model served it
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["model_used"], constants::TEST_FALLBACK_MODEL);
    assert_eq!(json["response"], "Fallback knows Penang too");
}

#[tokio::test]
async fn test_fallback_failure_surfaces_as_upstream_error() {
    let harness = TestHarness::new().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(2) // primary plus exactly one fallback, nothing more
        .mount(&harness.vertex)
        .await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::valid_chat_request())
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_generation_parameters_are_clamped_on_the_wire() {
    let harness = TestHarness::new().await;

    // The forwarded request must carry the clamped values, not the raw ones
    Mock::given(method("POST"))
        .and(path(primary_path()))
        .and(body_partial_json(json!({
            "generationConfig": {"temperature": 2.0, "maxOutputTokens": 8192}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response("ok")))
        .expect(1)
        .mount(&harness.vertex)
        .await;

    let response = harness
        .server
        .post("/chat")
        .json(&json!({
            "message": "clamp me",
            "temperature": 99.0,
            "max_tokens": 1_000_000
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_chat_with_history_reports_ideation_phase() {
    let harness = TestHarness::new().await;
    harness.mock_primary_success("More ideas coming up!").await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::chat_request_with_history())
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["phase"], "ideation");
}

#[tokio::test]
async fn test_directive_flags_reported() {
    let harness = TestHarness::new().await;
    harness
        .mock_primary_success("Look! [IMAGE: http://x] and [ACTION: Book, Hotel Penaga]")
        .await;

    let response = harness
        .server
        .post("/chat")
        .json(&test_data::valid_chat_request())
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["contains_images"], true);
    assert_eq!(json["contains_actions"], true);
}

#[tokio::test]
async fn test_chat_with_image_rejects_invalid_base64() {
    let harness = TestHarness::new().await;
    harness.expect_no_vertex_calls().await;

    let response = harness
        .server
        .post("/chat-with-image")
        .json(&json!({"message": "what is this?", "image_data": "!!!not-base64!!!"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_with_image_rejects_empty_request() {
    let harness = TestHarness::new().await;
    harness.expect_no_vertex_calls().await;

    let response = harness
        .server
        .post("/chat-with-image")
        .json(&json!({"message": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_with_image_accepts_large_image_under_ceiling() {
    let harness = TestHarness::new().await;
    harness.mock_primary_success("A grand view of the Petronas Towers.").await;

    // 8 MiB is under the 10 MiB ceiling but inflates past it once
    // base64-encoded; the body limit must still let it through.
    let mut bytes = test_data::png_bytes();
    bytes.resize(8 * 1024 * 1024, 0);
    let image_b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);

    let response = harness
        .server
        .post("/chat-with-image")
        .json(&json!({"message": "where is this?", "image_data": image_b64}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["response"], "A grand view of the Petronas Towers.");
}

#[tokio::test]
async fn test_chat_with_image_sends_inline_data() {
    let harness = TestHarness::new().await;
    let image_b64 = base64::engine::general_purpose::STANDARD.encode(test_data::jpeg_bytes());

    Mock::given(method("POST"))
        .and(path(primary_path()))
        .and(body_partial_json(json!({
            "contents": [{}, {}, {
                "role": "user",
                "parts": [
                    {"text": "what dish is this?"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": image_b64}}
                ]
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(model_response("That looks like nasi lemak!")),
        )
        .expect(1)
        .mount(&harness.vertex)
        .await;

    let response = harness
        .server
        .post("/chat-with-image")
        .json(&json!({"message": "what dish is this?", "image_data": image_b64}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["response"], "That looks like nasi lemak!");
    assert_eq!(json["model_used"], constants::TEST_PRIMARY_MODEL_USED);
}
