//! In-memory registry of uploads and their transcoding state.
//!
//! Persistence of listings belongs to the web application; this service only
//! needs enough bookkeeping to connect a direct-upload session to the
//! webhook events the video host sends while transcoding.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::mux::WebhookEvent;

/// Lifecycle of one uploaded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Upload session created, browser may still be sending bytes
    Waiting,
    /// Host accepted the file and is transcoding
    Preparing,
    /// Playback URL is live
    Ready,
    /// Host rejected or failed the asset
    Errored,
}

/// One tracked upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub upload_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    pub status: VideoStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Tracks uploads by upload id, advanced by webhook events.
#[derive(Clone, Default)]
pub struct VideoRegistry {
    records: Arc<RwLock<HashMap<String, VideoRecord>>>,
}

impl VideoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly created direct-upload session.
    pub async fn register_upload(&self, upload_id: &str, title: Option<String>) -> VideoRecord {
        let now = chrono::Utc::now().timestamp();
        let record = VideoRecord {
            upload_id: upload_id.to_string(),
            title,
            asset_id: None,
            playback_id: None,
            status: VideoStatus::Waiting,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.write().await;
        records.insert(upload_id.to_string(), record.clone());
        record
    }

    pub async fn get(&self, upload_id: &str) -> Option<VideoRecord> {
        let records = self.records.read().await;
        records.get(upload_id).cloned()
    }

    /// All tracked uploads, most recently touched first.
    pub async fn list(&self) -> Vec<VideoRecord> {
        let records = self.records.read().await;
        let mut all: Vec<VideoRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    /// Advance the matching record for an asset lifecycle event.
    ///
    /// Returns false when the event names no upload this registry knows,
    /// which is normal: webhooks arrive for assets created outside this
    /// process too.
    pub async fn apply_event(&self, event: &WebhookEvent) -> bool {
        let mut records = self.records.write().await;

        let record = records.values_mut().find(|r| {
            event.data.upload_id.as_deref() == Some(r.upload_id.as_str())
                || r.asset_id.as_deref() == Some(event.data.id.as_str())
        });
        let Some(record) = record else {
            debug!(event_type = %event.event_type, asset_id = %event.data.id, "webhook for unknown asset");
            return false;
        };

        match event.event_type.as_str() {
            "video.asset.created" => {
                record.asset_id = Some(event.data.id.clone());
                record.status = VideoStatus::Preparing;
            }
            "video.asset.ready" => {
                record.asset_id = Some(event.data.id.clone());
                record.playback_id = event.data.playback_ids.first().map(|p| p.id.clone());
                record.status = VideoStatus::Ready;
            }
            "video.asset.errored" => {
                record.asset_id = Some(event.data.id.clone());
                record.status = VideoStatus::Errored;
            }
            _ => return false,
        }

        record.updated_at = chrono::Utc::now().timestamp();
        true
    }
}
