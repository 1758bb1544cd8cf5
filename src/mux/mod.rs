//! Mux video host integration.
//!
//! Two surfaces of the same vendor: the authenticated management API used to
//! create direct-upload sessions, and the public playback CDN probed and
//! fetched by [`PlaybackClient`]. Webhook event types consumed by the upload
//! lifecycle also live here.

mod playback;

pub use playback::{PlaybackClient, PlaybackError, RetryPolicy};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MuxConfig;
use crate::error::AppError;

/// Errors from the Mux management API
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mux API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<MuxError> for AppError {
    fn from(err: MuxError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<PlaybackError> for AppError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::NotReady { .. } => AppError::VideoNotReady(err.to_string()),
            PlaybackError::Permanent { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

/// A direct-upload session created on the host.
///
/// The returned `url` is handed to the browser, which PUTs the raw file
/// straight to the host; this service never sees the upload bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectUpload {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    data: DirectUpload,
}

#[derive(Debug, Serialize)]
struct CreateUploadRequest<'a> {
    new_asset_settings: NewAssetSettings<'a>,
    cors_origin: &'a str,
}

#[derive(Debug, Serialize)]
struct NewAssetSettings<'a> {
    playback_policy: [&'a str; 1],
    mp4_support: &'a str,
    video_quality: &'a str,
}

/// Client for the authenticated Mux management API
#[derive(Clone)]
pub struct MuxClient {
    http: Client,
    api_base_url: String,
    token_id: String,
    token_secret: String,
}

impl MuxClient {
    pub fn new(config: &MuxConfig) -> Self {
        let http = Client::builder()
            .user_agent(concat!("tour-sidecar/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token_id: config.token_id.clone(),
            token_secret: config.token_secret.clone(),
        }
    }

    /// Create a direct-upload session.
    ///
    /// MP4 support is required: the analysis pipeline fetches the finished
    /// rendition as a plain MP4 rather than an HLS stream.
    pub async fn create_direct_upload(&self) -> Result<DirectUpload, MuxError> {
        let url = format!("{}/video/v1/uploads", self.api_base_url);
        let request = CreateUploadRequest {
            new_asset_settings: NewAssetSettings {
                playback_policy: ["public"],
                mp4_support: "standard",
                video_quality: "plus",
            },
            cors_origin: "*",
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MuxError::Status { status, body });
        }

        let envelope: UploadEnvelope = response.json().await?;
        Ok(envelope.data)
    }
}

/// Webhook notification from the video host.
///
/// Only the asset lifecycle events are acted on; everything else is
/// acknowledged and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookAsset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAsset {
    pub id: String,
    #[serde(default)]
    pub upload_id: Option<String>,
    #[serde(default)]
    pub playback_ids: Vec<WebhookPlaybackId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPlaybackId {
    pub id: String,
}
