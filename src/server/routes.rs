//! HTTP route handlers.

use axum::{extract::State, Json};

use crate::types::{
    ConfigResponse, GeminiInfo, HealthResponse, HealthStatus, MuxInfo, PlacesInfo, ServerInfo,
};

use super::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check endpoint
///
/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    // Degraded until both upstream credentials are in place
    let status = if config.gemini.api_key.is_empty()
        || config.mux.token_id.is_empty()
        || config.mux.token_secret.is_empty()
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    Json(HealthResponse {
        status,
        version: VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Configuration endpoint
///
/// GET /api/v1/config
pub async fn config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;

    Json(ConfigResponse {
        server: ServerInfo {
            host: config.server.host.clone(),
            port: config.server.port,
        },
        mux: MuxInfo {
            stream_base_url: config.mux.stream_base_url.clone(),
            rendition: config.mux.rendition.clone(),
            probe_max_attempts: config.mux.probe.max_attempts,
            fetch_max_attempts: config.mux.fetch.max_attempts,
            configured: !config.mux.token_id.is_empty() && !config.mux.token_secret.is_empty(),
        },
        gemini: GeminiInfo {
            model: config.gemini.model.clone(),
            configured: !config.gemini.api_key.is_empty(),
        },
        places: PlacesInfo {
            configured: !config.places.api_key.is_empty(),
        },
    })
}
