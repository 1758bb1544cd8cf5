//! Video tour analysis orchestration.
//!
//! The workflow behind the upload flow's "AI is watching your video" step:
//! fetch the finished MP4 from the video host, hand it to the inference
//! service with a fixed prompt, and turn the free-text reply into a typed
//! [`VideoAnalysis`]. Only the byte fetch can fail the call; everything
//! downstream of a successful fetch degrades to a fixed fallback result so
//! the upload flow always reaches the room-selection step.

pub mod prompts;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::gemini::{GeminiClient, GeminiError};
use crate::mux::{PlaybackClient, PlaybackError};

/// One room sighting: a display label and the `mm:ss` (or `h:mm:ss`)
/// timestamp where it first appears in the tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomObservation {
    pub room: String,
    pub timestamp: String,
}

/// Bedroom/bathroom counts extracted from the tour.
///
/// Fields are absent when the video does not make them clear, never zero,
/// which would read as a studio with no bathroom. Bathrooms allow half steps
/// (1.5 baths) while bedrooms stay whole; the asymmetry is deliberate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
}

/// Full analysis of one tour video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysis {
    /// Rooms in order of appearance. Never empty in a returned value: the
    /// fallback substitutes a single unlabeled room instead.
    pub rooms: Vec<RoomObservation>,
    #[serde(default)]
    pub property_info: PropertyInfo,
    /// Free-text amenity labels, order preserved, duplicates kept.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_description: Option<String>,
}

impl VideoAnalysis {
    /// The safe default returned when analysis cannot be validated.
    ///
    /// One unlabeled room at the start of the video gives the caller's
    /// room-selection UI something to show instead of dead-ending the
    /// upload flow.
    pub fn fallback() -> Self {
        Self {
            rooms: vec![RoomObservation {
                room: "Room 1".to_string(),
                timestamp: "0:00".to_string(),
            }],
            property_info: PropertyInfo::default(),
            tags: Vec::new(),
            video_description: None,
        }
    }
}

/// Failures between a successful byte fetch and a validated result.
///
/// These never cross the analyzer's boundary; they all collapse into the
/// fallback result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("no JSON value found in model response")]
    MissingJson,

    #[error("malformed JSON in model response: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("model response failed validation: {0}")]
    InvalidShape(&'static str),
}

/// Orchestrates fetch, inference, and response validation for one video.
#[derive(Clone)]
pub struct Analyzer {
    playback: PlaybackClient,
    gemini: GeminiClient,
}

impl Analyzer {
    pub fn new(playback: PlaybackClient, gemini: GeminiClient) -> Self {
        Self { playback, gemini }
    }

    /// Analyze the tour video behind a playback id.
    ///
    /// Errors only if the video bytes cannot be fetched within the retry
    /// budget. Inference and parsing failures return the fallback result
    /// instead.
    pub async fn analyze(&self, playback_id: &str) -> Result<VideoAnalysis, PlaybackError> {
        let bytes = self.playback.fetch_video(playback_id).await?;
        let encoded = general_purpose::STANDARD.encode(&bytes);
        debug!(playback_id, video_bytes = bytes.len(), "video encoded for inference");

        match self.run_inference(&encoded).await {
            Ok(analysis) => {
                debug!(
                    playback_id,
                    rooms = analysis.rooms.len(),
                    tags = analysis.tags.len(),
                    "analysis validated"
                );
                Ok(analysis)
            }
            Err(e) => {
                warn!(playback_id, error = %e, "analysis failed, returning fallback result");
                Ok(VideoAnalysis::fallback())
            }
        }
    }

    async fn run_inference(&self, video_base64: &str) -> Result<VideoAnalysis, AnalysisError> {
        let text = self
            .gemini
            .describe_video(video_base64, prompts::ROOM_ANALYSIS_PROMPT)
            .await?;
        parse_analysis(&text)
    }
}

/// Parse a model reply into a validated analysis.
///
/// The reply should be pure JSON but is not guaranteed to be; the first
/// balanced object (or, for the bare room-list shape, array) substring is
/// extracted before parsing.
pub fn parse_analysis(text: &str) -> Result<VideoAnalysis, AnalysisError> {
    let raw = extract_json_value(text).ok_or(AnalysisError::MissingJson)?;
    let value: Value = serde_json::from_str(raw)?;
    validate_analysis(value)
}

/// Locate the first balanced JSON object or array substring.
///
/// Whichever value opens first wins: a bare room list contains objects
/// inside its array, so trying objects unconditionally would grab a single
/// entry instead of the list.
fn extract_json_value(text: &str) -> Option<&str> {
    let first_object = text.find('{');
    let first_array = text.find('[');

    let array_first = match (first_array, first_object) {
        (Some(a), Some(o)) => a < o,
        (Some(_), None) => true,
        _ => false,
    };

    if array_first {
        extract_balanced(text, '[', ']').or_else(|| extract_balanced(text, '{', '}'))
    } else {
        extract_balanced(text, '{', '}').or_else(|| extract_balanced(text, '[', ']'))
    }
}

/// Scan from the first `open` character to its balancing `close`, skipping
/// string literals so braces inside labels don't throw off the depth count.
fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..start + i + c.len_utf8()]);
            }
        }
    }

    None
}

/// Validate parsed JSON into a typed analysis.
///
/// A bare array is the room-list-only shape; an object carries the full
/// analysis. Malformed room entries reject the whole payload, while invalid
/// tags and property-info values are dropped silently.
fn validate_analysis(value: Value) -> Result<VideoAnalysis, AnalysisError> {
    match value {
        Value::Array(entries) => Ok(VideoAnalysis {
            rooms: validate_rooms(entries)?,
            property_info: PropertyInfo::default(),
            tags: Vec::new(),
            video_description: None,
        }),
        Value::Object(mut map) => {
            let rooms = match map.remove("rooms") {
                Some(Value::Array(entries)) => validate_rooms(entries)?,
                _ => return Err(AnalysisError::InvalidShape("rooms must be an array")),
            };

            let property_info = map
                .remove("propertyInfo")
                .map(validate_property_info)
                .unwrap_or_default();

            let tags = match map.remove("tags") {
                Some(Value::Array(values)) => values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
                Some(_) => return Err(AnalysisError::InvalidShape("tags must be an array")),
                None => Vec::new(),
            };

            let video_description = match map.remove("videoDescription") {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
                _ => None,
            };

            Ok(VideoAnalysis {
                rooms,
                property_info,
                tags,
                video_description,
            })
        }
        _ => Err(AnalysisError::InvalidShape("expected a JSON object or array")),
    }
}

fn validate_rooms(entries: Vec<Value>) -> Result<Vec<RoomObservation>, AnalysisError> {
    let mut rooms = Vec::with_capacity(entries.len());

    for entry in entries {
        let Value::Object(map) = entry else {
            return Err(AnalysisError::InvalidShape("room entry must be an object"));
        };
        let room = match map.get("room") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(AnalysisError::InvalidShape("room entry missing string room")),
        };
        let timestamp = match map.get("timestamp") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(AnalysisError::InvalidShape(
                    "room entry missing string timestamp",
                ))
            }
        };
        rooms.push(RoomObservation { room, timestamp });
    }

    if rooms.is_empty() {
        return Err(AnalysisError::InvalidShape("rooms array is empty"));
    }

    Ok(rooms)
}

/// Property-info values that don't fit their type are dropped, not zeroed:
/// bedrooms must be a non-negative integer, bathrooms any non-negative
/// number (1.5 baths is a real listing).
fn validate_property_info(value: Value) -> PropertyInfo {
    let Value::Object(map) = value else {
        return PropertyInfo::default();
    };

    let bedrooms = map
        .get("bedrooms")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    let bathrooms = map
        .get("bathrooms")
        .and_then(Value::as_f64)
        .filter(|n| *n >= 0.0);

    PropertyInfo { bedrooms, bathrooms }
}
