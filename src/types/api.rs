//! API request and response types for the video and places endpoints.

use serde::{Deserialize, Serialize};

use crate::analysis::VideoAnalysis;
use crate::places::Prediction;
use crate::registry::VideoRecord;

/// Response from the readiness check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub success: bool,
    pub is_ready: bool,
}

/// Response from the video analysis, the analysis fields flattened alongside
/// the success marker as the listing frontend expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analysis: VideoAnalysis,
}

/// Request to create a direct-upload session
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUploadRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Response with the browser-facing upload URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUploadResponse {
    pub id: String,
    pub url: String,
}

/// Response listing tracked uploads
#[derive(Debug, Clone, Serialize)]
pub struct ListVideosResponse {
    pub videos: Vec<VideoRecord>,
}

/// Webhook acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Autocomplete query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub input: Option<String>,
}

/// Autocomplete response; upstream failures carry an error message next to
/// an empty prediction list rather than failing the address form
#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiMessage>,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Place details query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsParams {
    #[serde(default)]
    pub place_id: Option<String>,
}
