//! Integration tests for the EcoSort HTTP API.
//!
//! Uses axum-test against the real router, with wiremock standing in for the
//! AI gateway, Nominatim and Overpass.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{Method, StatusCode};
use axum_test::TestServer;
use ecosort::api::{AppState, router};
use ecosort::config::{AppConfig, SearchConfig, ServerConfig, UpstreamConfig};
use ecosort_core::MAX_IMAGE_BYTES;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 1x1 transparent PNG.
const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct Harness {
    server: TestServer,
    upstream: MockServer,
    _dir: TempDir,
}

fn config(upstream_uri: &str, dir: &TempDir, gateway_key: Option<&str>, api_key: Option<&str>) -> AppConfig {
    let upstream = UpstreamConfig {
        gateway_url: upstream_uri.to_string(),
        gateway_key: gateway_key.map(str::to_string),
        nominatim_url: upstream_uri.to_string(),
        overpass_url: upstream_uri.to_string(),
        timeout_secs: 5,
        ..UpstreamConfig::default()
    };
    let server = ServerConfig {
        api_key: api_key.map(str::to_string),
        rate_limit_per_minute: 100,
        ..ServerConfig::default()
    };
    AppConfig::new(
        upstream,
        SearchConfig::default(),
        server,
        dir.path().join("impact.redb"),
    )
}

async fn harness_with(gateway_key: Option<&str>, api_key: Option<&str>) -> Harness {
    let upstream = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(&config(&upstream.uri(), &dir, gateway_key, api_key)).unwrap();
    let server = TestServer::new(router(Arc::new(state))).unwrap();
    Harness {
        server,
        upstream,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    harness_with(Some("test-gateway-key"), None).await
}

fn completion(arguments: &Value) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "classify_ewaste",
                        "arguments": arguments.to_string()
                    }
                }]
            }
        }]
    })
}

fn battery_classification() -> Value {
    json!({
        "category": "Batteries",
        "confidence": 94,
        "item": "Lithium-ion phone battery",
        "materials": ["lithium", "cobalt"],
        "recycling_guidance": "Take to a battery drop-off point.",
        "hazards": ["Fire risk if punctured"],
        "disposal_steps": ["Tape the terminals", "Drop off at a collection point"]
    })
}

async fn mock_gateway_status(upstream: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
        .mount(upstream)
        .await;
}

async fn mock_berlin(upstream: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "52.5200", "lon": "13.4050", "display_name": "Berlin, Germany" }
        ])))
        .mount(upstream)
        .await;
}

fn berlin_elements() -> Value {
    json!({
        "elements": [
            {
                "type": "node", "id": 2, "lat": 52.5300, "lon": 13.4050,
                "tags": { "amenity": "recycling", "name": "Far Yard", "recycling:batteries": "yes" }
            },
            {
                "type": "node", "id": 1, "lat": 52.5210, "lon": 13.4050,
                "tags": {
                    "amenity": "recycling", "name": "Near Depot",
                    "recycling:electronics": "yes", "opening_hours": "Mo-Fr 08:00-18:00"
                }
            },
            {
                "type": "way", "id": 3, "center": { "lat": 52.5250, "lon": 13.4050 },
                "tags": { "amenity": "recycling", "recycling:computers": "yes" }
            },
            { "type": "node", "id": 4, "tags": { "name": "No position" } }
        ]
    })
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// CLASSIFY
// =============================================================================

#[tokio::test]
async fn test_classify_success() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-gateway-key"))
        .and(body_string_contains("classify_ewaste"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&battery_classification())))
        .expect(1)
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["classification"]["category"], "Batteries");
    assert_eq!(body["classification"]["item"], "Lithium-ion phone battery");
    assert_eq!(body["classification"]["disposal_steps"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_classify_passes_through_rate_limit() {
    let h = harness().await;
    mock_gateway_status(&h.upstream, 429).await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn test_classify_passes_through_quota_exceeded() {
    let h = harness().await;
    mock_gateway_status(&h.upstream, 402).await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = response.json();
    assert_eq!(body["error"], "AI service quota exceeded. Please contact support.");
}

#[tokio::test]
async fn test_classify_other_gateway_failure_is_500() {
    let h = harness().await;
    mock_gateway_status(&h.upstream, 503).await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "AI Gateway error: 503");
}

#[tokio::test]
async fn test_classify_without_tool_call_is_500() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "a battery" } }]
        })))
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "No classification result from AI");
}

#[tokio::test]
async fn test_classify_rejects_non_image_before_calling_gateway() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": "data:application/pdf;base64,JVBERi0=" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please upload an image file (JPG, PNG, etc.)");
}

#[tokio::test]
async fn test_classify_rejects_oversized_image_with_400() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.upstream)
        .await;

    // Every "AAAA" group decodes to three bytes.
    let groups = (MAX_IMAGE_BYTES + 2) / 3;
    let image = format!("data:image/png;base64,{}", "AAAA".repeat(groups));
    assert!(groups * 3 > MAX_IMAGE_BYTES);

    let response = h.server.post("/classify").json(&json!({ "image": image })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please upload an image smaller than 10MB");
}

#[tokio::test]
async fn test_classify_rejects_missing_image_field() {
    let h = harness().await;
    let response = h.server.post("/classify").json(&json!({ "picture": "x" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_classify_without_gateway_key_is_500() {
    let h = harness_with(None, None).await;
    let response = h
        .server
        .post("/classify")
        .json(&json!({ "image": PNG_DATA_URL }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "AI gateway API key is not configured");
}

// =============================================================================
// CENTERS
// =============================================================================

#[tokio::test]
async fn test_centers_sorted_and_truncated() {
    let h = harness().await;
    mock_berlin(&h.upstream).await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_elements()))
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .get("/centers")
        .add_query_param("location", "Berlin")
        .add_query_param("limit", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["origin"]["display_name"], "Berlin, Germany");

    let centers = body["centers"].as_array().unwrap();
    assert_eq!(centers.len(), 2);
    assert_eq!(centers[0]["name"], "Near Depot");
    assert_eq!(centers[0]["hours"], "Mo-Fr 08:00-18:00");
    assert_eq!(centers[1]["id"], "way/3");
    assert!(centers[0]["distance_km"].as_f64().unwrap() < centers[1]["distance_km"].as_f64().unwrap());
}

#[tokio::test]
async fn test_centers_with_coordinates_skips_geocoding() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&h.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .get("/centers")
        .add_query_param("location", "52.52, 13.405")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["centers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_centers_empty_location_is_400() {
    let h = harness().await;
    let response = h.server.get("/centers").add_query_param("location", "   ").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please enter a location to search");
}

#[tokio::test]
async fn test_centers_unknown_location_is_404() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .get("/centers")
        .add_query_param("location", "Nowhereville")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Location not found: Nowhereville");
}

#[tokio::test]
async fn test_centers_overpass_failure_is_502() {
    let h = harness().await;
    mock_berlin(&h.upstream).await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&h.upstream)
        .await;

    let response = h
        .server
        .get("/centers")
        .add_query_param("location", "Berlin")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_centers_geocode_is_cached() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "52.5200", "lon": "13.4050", "display_name": "Berlin, Germany" }
        ])))
        .expect(1)
        .mount(&h.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .mount(&h.upstream)
        .await;

    for query in ["Berlin", "  berlin "] {
        h.server
            .get("/centers")
            .add_query_param("location", query)
            .await
            .assert_status_ok();
    }
}

// =============================================================================
// IMPACT
// =============================================================================

#[tokio::test]
async fn test_impact_starts_empty() {
    let h = harness().await;
    let response = h.server.get("/impact").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["stats"]["items_recycled"], 0);
    assert_eq!(body["stats"]["level"], 1);
    assert_eq!(body["achievements"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_record_item_updates_report() {
    let h = harness().await;

    let response = h
        .server
        .post("/impact/items")
        .json(&json!({ "category": "circuit boards", "item": "Old router" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 0);
    assert_eq!(body["report"]["stats"]["items_recycled"], 1);
    assert_eq!(body["report"]["by_category"]["Circuit Boards"], 1);
    assert_eq!(body["report"]["achievements"][0]["unlocked"], true);

    let report: Value = h.server.get("/impact").await.json();
    assert_eq!(report["stats"]["items_recycled"], 1);
}

#[tokio::test]
async fn test_record_item_rejects_unknown_category() {
    let h = harness().await;
    let response = h
        .server
        .post("/impact/items")
        .json(&json!({ "category": "Furniture", "item": "Chair" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_impact_demo() {
    let h = harness().await;
    let body: Value = h.server.get("/impact/demo").await.json();
    assert_eq!(body["stats"]["items_recycled"], 12);
    assert_eq!(body["stats"]["level"], 3);
    assert_eq!(body["stats"]["next_level_items"], 8);

    let unlocked: Vec<bool> = body["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["unlocked"].as_bool().unwrap())
        .collect();
    assert_eq!(unlocked, vec![true, true, true, false, false]);
}

// =============================================================================
// EDUCATION
// =============================================================================

#[tokio::test]
async fn test_education_content() {
    let h = harness().await;
    let response = h.server.get("/education").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(!body["ewaste_types"].as_array().unwrap().is_empty());
    assert!(!body["faq"].as_array().unwrap().is_empty());
}

// =============================================================================
// AUTH
// =============================================================================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let h = harness_with(Some("k"), Some("server-secret")).await;

    h.server.get("/health").await.assert_status_ok();

    let response = h.server.get("/impact/demo").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    h.server
        .get("/impact/demo")
        .authorization_bearer("wrong")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    h.server
        .get("/impact/demo")
        .authorization_bearer("server-secret")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_cors_preflight_skips_api_key() {
    let h = harness_with(Some("k"), Some("server-secret")).await;

    let response = h
        .server
        .method(Method::OPTIONS, "/classify")
        .add_header("origin", "https://app.example")
        .add_header("access-control-request-method", "POST")
        .add_header("access-control-request-headers", "authorization,content-type")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
    let allowed = response
        .header("access-control-allow-headers")
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "missing {name} in {allowed}");
    }
}

// =============================================================================
// RATE LIMIT
// =============================================================================

#[tokio::test]
async fn test_classify_rate_limited_locally() {
    let upstream = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&upstream.uri(), &dir, Some("k"), None);
    cfg.server.rate_limit_per_minute = 1;
    let server = TestServer::new(router(Arc::new(AppState::new(&cfg).unwrap()))).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&battery_classification())))
        .expect(1)
        .mount(&upstream)
        .await;

    let image = json!({ "image": PNG_DATA_URL });
    server.post("/classify").json(&image).await.assert_status_ok();
    server
        .post("/classify")
        .json(&image)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
