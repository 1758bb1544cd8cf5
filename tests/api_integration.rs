//! Integration tests for API endpoints.
//!
//! These tests verify the API endpoints work correctly without reaching any
//! real upstream: the Mux CDN, the Mux management API, and Gemini are played
//! by throwaway local servers.

use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};

use tour_sidecar::config::{AppConfig, BackoffKind, RetryConfig};
use tour_sidecar::server::{create_router, AppState};

/// Bind a stub upstream on a random local port
async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Fast retry budgets so exhaustion tests finish in milliseconds
fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        delay_ms: 5,
        backoff: BackoffKind::Fixed,
    }
}

fn create_test_server(config: AppConfig) -> TestServer {
    let state = AppState::new(config);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Stub Gemini that always answers with the given text
fn gemini_stub(text: &str) -> Router {
    let reply = json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    });
    Router::new().route(
        "/v1beta/models/:model",
        post(move || async move { Json(reply) }),
    )
}

/// Stub CDN that serves a tiny MP4 payload for every playback id
fn cdn_stub() -> Router {
    Router::new().route(
        "/:id/capped-1080p.mp4",
        get(|| async { (StatusCode::OK, "tiny-mp4-payload") }),
    )
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server(AppConfig::default());

    let response = server.get("/api/v1/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    // No credentials configured, so the service reports itself degraded
    assert_eq!(body["status"], "degraded");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_healthy_when_configured() {
    let mut config = AppConfig::default();
    config.gemini.api_key = "key".to_string();
    config.mux.token_id = "id".to_string();
    config.mux.token_secret = "secret".to_string();
    let server = create_test_server(config);

    let response = server.get("/api/v1/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_config_endpoint() {
    let server = create_test_server(AppConfig::default());

    let response = server.get("/api/v1/config").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["gemini"]["model"], "gemini-2.0-flash");
    assert_eq!(body["mux"]["probe_max_attempts"], 100);
    assert_eq!(body["gemini"]["configured"], false);
}

#[tokio::test]
async fn test_ready_when_rendition_is_live() {
    let cdn = spawn_stub(cdn_stub()).await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.probe = fast_retry(3);
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["isReady"], true);
}

#[tokio::test]
async fn test_ready_exhaustion_maps_to_video_not_ready() {
    let cdn = spawn_stub(Router::new().route(
        "/:id/capped-1080p.mp4",
        get(|| async { StatusCode::NOT_FOUND }),
    ))
    .await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.probe = fast_retry(3);
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/ready").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VIDEO_NOT_READY");
}

#[tokio::test]
async fn test_analyze_end_to_end() {
    let cdn = spawn_stub(cdn_stub()).await;
    let gemini = spawn_stub(gemini_stub(
        r#"{"rooms":[{"room":"Living Room","timestamp":"0:00"},{"room":"Kitchen","timestamp":"0:42"},{"room":"Bathroom","timestamp":"1:30"}],"propertyInfo":{"bedrooms":1},"tags":["balcony","dishwasher"]}"#,
    ))
    .await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.fetch = fast_retry(3);
    config.gemini.base_url = format!("http://{gemini}");
    config.gemini.api_key = "test-key".to_string();
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/analyze").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 3);
    assert_eq!(rooms[0]["room"], "Living Room");
    assert_eq!(rooms[1]["room"], "Kitchen");
    assert_eq!(rooms[2]["timestamp"], "1:30");

    assert_eq!(body["tags"], json!(["balcony", "dishwasher"]));
    assert_eq!(body["propertyInfo"]["bedrooms"], 1);
    // Undetermined counts stay absent, never zero
    assert!(body["propertyInfo"].get("bathrooms").is_none());
}

#[tokio::test]
async fn test_analyze_falls_back_on_unparsable_reply() {
    let cdn = spawn_stub(cdn_stub()).await;
    let gemini = spawn_stub(gemini_stub("I'm not sure what rooms are shown.")).await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.fetch = fast_retry(3);
    config.gemini.base_url = format!("http://{gemini}");
    config.gemini.api_key = "test-key".to_string();
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/analyze").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "success": true,
            "rooms": [{"room": "Room 1", "timestamp": "0:00"}],
            "propertyInfo": {},
            "tags": []
        })
    );
}

#[tokio::test]
async fn test_analyze_falls_back_when_inference_errors() {
    let cdn = spawn_stub(cdn_stub()).await;
    let gemini = spawn_stub(Router::new().route(
        "/v1beta/models/:model",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.fetch = fast_retry(3);
    config.gemini.base_url = format!("http://{gemini}");
    config.gemini.api_key = "test-key".to_string();
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/analyze").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["rooms"][0]["room"], "Room 1");
    assert_eq!(body["rooms"][0]["timestamp"], "0:00");
}

#[tokio::test]
async fn test_analyze_errors_when_video_unfetchable() {
    let cdn = spawn_stub(Router::new().route(
        "/:id/capped-1080p.mp4",
        get(|| async { StatusCode::NOT_FOUND }),
    ))
    .await;

    let mut config = AppConfig::default();
    config.mux.stream_base_url = format!("http://{cdn}");
    config.mux.fetch = fast_retry(2);
    config.gemini.api_key = "test-key".to_string();
    let server = create_test_server(config);

    let response = server.get("/api/v1/videos/abc123/analyze").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VIDEO_NOT_READY");
}

#[tokio::test]
async fn test_upload_webhook_list_lifecycle() {
    let mux_api = spawn_stub(Router::new().route(
        "/video/v1/uploads",
        post(|| async {
            Json(json!({"data": {"id": "up-1", "url": "https://upload.example/put"}}))
        }),
    ))
    .await;

    let mut config = AppConfig::default();
    config.mux.api_base_url = format!("http://{mux_api}");
    config.mux.token_id = "id".to_string();
    config.mux.token_secret = "secret".to_string();
    let server = create_test_server(config);

    // Create the upload session
    let response = server.post("/api/v1/uploads").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], "up-1");
    assert_eq!(body["url"], "https://upload.example/put");

    // Host finishes transcoding and calls back
    let response = server
        .post("/api/v1/webhooks/mux")
        .json(&json!({
            "type": "video.asset.ready",
            "data": {"id": "asset-1", "upload_id": "up-1", "playback_ids": [{"id": "play-1"}]}
        }))
        .await;
    response.assert_status_ok();

    // The registry reflects the ready asset
    let response = server.get("/api/v1/videos").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["status"], "ready");
    assert_eq!(videos[0]["playbackId"], "play-1");
}

#[tokio::test]
async fn test_webhook_for_unknown_asset_still_acknowledged() {
    let server = create_test_server(AppConfig::default());

    let response = server
        .post("/api/v1/webhooks/mux")
        .json(&json!({
            "type": "video.asset.ready",
            "data": {"id": "stranger", "playback_ids": []}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_autocomplete_without_input_returns_empty() {
    let server = create_test_server(AppConfig::default());

    let response = server.get("/api/v1/places/autocomplete").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["predictions"], json!([]));
}

#[tokio::test]
async fn test_autocomplete_proxies_predictions() {
    let places = spawn_stub(Router::new().route(
        "/autocomplete/json",
        get(|| async {
            Json(json!({
                "status": "OK",
                "predictions": [
                    {"description": "1 Main St, Springfield, IL, USA", "place_id": "p1"},
                    {"description": "1 Main Ave, Chicago, IL, USA", "place_id": "p2"},
                    {"description": "1 Main Rd, Austin, TX, USA", "place_id": "p3"},
                    {"description": "1 Main Blvd, Reno, NV, USA", "place_id": "p4"}
                ]
            }))
        }),
    ))
    .await;

    let mut config = AppConfig::default();
    config.places.base_url = format!("http://{places}");
    config.places.api_key = "places-key".to_string();
    let server = create_test_server(config);

    let response = server
        .get("/api/v1/places/autocomplete")
        .add_query_param("input", "1 Main")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    // Only the top three suggestions are exposed
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions[0]["place_id"], "p1");
}

#[tokio::test]
async fn test_autocomplete_upstream_failure_degrades_gracefully() {
    let server = create_test_server(AppConfig::default());

    // No Places key configured; the form still gets a well-formed reply
    let response = server
        .get("/api/v1/places/autocomplete")
        .add_query_param("input", "1 Main")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["predictions"], json!([]));
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_details_requires_place_id() {
    let server = create_test_server(AppConfig::default());

    let response = server.get("/api/v1/places/details").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
