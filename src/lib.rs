//! Tour Sidecar
//!
//! A lightweight sidecar service for a rental-listing application that owns
//! the video-tour workflow: Mux direct uploads and readiness polling, Gemini
//! room/amenity analysis with a safe fallback, and a Google Places address
//! autocomplete proxy.

pub mod analysis;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mux;
pub mod places;
pub mod registry;
pub mod server;
pub mod types;

pub use analysis::{Analyzer, PropertyInfo, RoomObservation, VideoAnalysis};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use mux::{PlaybackClient, PlaybackError};
