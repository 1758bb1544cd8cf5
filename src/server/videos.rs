//! Video upload, readiness, and analysis route handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{debug, info};

use crate::error::AppError;
use crate::mux::WebhookEvent;
use crate::types::{
    AnalyzeResponse, CreateUploadRequest, CreateUploadResponse, ListVideosResponse, ReadyResponse,
    WebhookAck,
};

use super::AppState;

/// POST /api/v1/uploads
///
/// Create a direct-upload session on the video host and start tracking it.
/// The browser uploads straight to the returned URL.
pub async fn create_upload(
    State(state): State<AppState>,
    body: Option<Json<CreateUploadRequest>>,
) -> Result<Json<CreateUploadResponse>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let upload = state.mux.create_direct_upload().await?;
    state
        .registry
        .register_upload(&upload.id, request.title)
        .await;

    info!(upload_id = %upload.id, "direct upload created");

    Ok(Json(CreateUploadResponse {
        id: upload.id,
        url: upload.url,
    }))
}

/// GET /api/v1/videos
///
/// List tracked uploads, most recently touched first.
pub async fn list_videos(State(state): State<AppState>) -> Json<ListVideosResponse> {
    Json(ListVideosResponse {
        videos: state.registry.list().await,
    })
}

/// POST /api/v1/webhooks/mux
///
/// Consume asset lifecycle notifications from the video host. Unknown assets
/// and unhandled event types are acknowledged all the same; the host retries
/// anything that isn't a 2xx.
pub async fn mux_webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> Json<WebhookAck> {
    let matched = state.registry.apply_event(&event).await;
    debug!(event_type = %event.event_type, matched, "webhook processed");
    Json(WebhookAck { ok: true })
}

/// GET /api/v1/videos/:playback_id/ready
///
/// Poll the playback URL until the transcoded rendition answers. Exhausting
/// the probe budget maps to 400 VIDEO_NOT_READY, which the frontend treats
/// as "try again shortly".
pub async fn ready(
    State(state): State<AppState>,
    Path(playback_id): Path<String>,
) -> Result<Json<ReadyResponse>, AppError> {
    state.playback.poll_until_ready(&playback_id).await?;

    Ok(Json(ReadyResponse {
        success: true,
        is_ready: true,
    }))
}

/// GET /api/v1/videos/:playback_id/analyze
///
/// Run the AI room analysis. Only an unfetchable video errors; an analysis
/// that cannot be validated comes back as the fallback result so the upload
/// flow can continue to room selection.
pub async fn analyze(
    State(state): State<AppState>,
    Path(playback_id): Path<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = state.analyzer.analyze(&playback_id).await?;

    info!(
        %playback_id,
        rooms = analysis.rooms.len(),
        tags = analysis.tags.len(),
        "video analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}
