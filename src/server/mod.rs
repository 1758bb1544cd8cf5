//! HTTP server setup and routing.

mod places;
mod routes;
mod videos;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::analysis::Analyzer;
use crate::config::AppConfig;
use crate::gemini::GeminiClient;
use crate::mux::{MuxClient, PlaybackClient};
use crate::places::PlacesClient;
use crate::registry::VideoRegistry;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub playback: PlaybackClient,
    pub analyzer: Arc<Analyzer>,
    pub mux: MuxClient,
    pub places: PlacesClient,
    pub registry: VideoRegistry,
    /// Server start time for uptime calculation
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let playback = PlaybackClient::new(&config.mux);
        let gemini = GeminiClient::new(&config.gemini);
        let analyzer = Arc::new(Analyzer::new(playback.clone(), gemini));
        let mux = MuxClient::new(&config.mux);
        let places = PlacesClient::new(&config.places);

        Self {
            config: Arc::new(config),
            playback,
            analyzer,
            mux,
            places,
            registry: VideoRegistry::new(),
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Creates the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::config))
        // Upload lifecycle
        .route("/uploads", post(videos::create_upload))
        .route("/videos", get(videos::list_videos))
        .route("/webhooks/mux", post(videos::mux_webhook))
        // Readiness and analysis
        .route("/videos/:playback_id/ready", get(videos::ready))
        .route("/videos/:playback_id/analyze", get(videos::analyze))
        // Address autocomplete
        .route("/places/autocomplete", get(places::autocomplete))
        .route("/places/details", get(places::details));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
