//! Google Places proxy client.
//!
//! Address autocomplete for the listing form. The browser talks to this
//! service, never to Google directly, so the API key stays server-side.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PlacesConfig;

/// Errors from the Places API
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("places API error: {0}")]
    Api(String),

    #[error("places API key is not configured")]
    MissingKey,
}

/// One address suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteEnvelope {
    #[serde(default)]
    predictions: Vec<Prediction>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

/// Resolved address for a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    result: Option<PlaceDetails>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

/// Client for the Google Places API
#[derive(Clone)]
pub struct PlacesClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(config: &PlacesConfig) -> Self {
        let http = Client::builder()
            .user_agent(concat!("tour-sidecar/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Top US address suggestions for a partial input, capped at three.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, PlacesError> {
        if !self.is_configured() {
            return Err(PlacesError::MissingKey);
        }

        let url = format!("{}/autocomplete/json", self.base_url);
        let envelope: AutocompleteEnvelope = self
            .http
            .get(&url)
            .query(&[
                ("input", input),
                ("key", self.api_key.as_str()),
                ("components", "country:us"),
                ("types", "address"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if envelope.status == "ZERO_RESULTS" {
            return Ok(Vec::new());
        }
        if envelope.status != "OK" {
            return Err(PlacesError::Api(envelope.error_message.unwrap_or_else(
                || "Failed to fetch suggestions".to_string(),
            )));
        }

        let mut predictions = envelope.predictions;
        predictions.truncate(3);
        Ok(predictions)
    }

    /// Formatted address and components for a place id.
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        if !self.is_configured() {
            return Err(PlacesError::MissingKey);
        }

        let url = format!("{}/details/json", self.base_url);
        let envelope: DetailsEnvelope = self
            .http
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("key", self.api_key.as_str()),
                ("fields", "formatted_address,address_components"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if envelope.status != "OK" {
            return Err(PlacesError::Api(envelope.error_message.unwrap_or_else(
                || "Failed to fetch place details".to_string(),
            )));
        }

        envelope
            .result
            .ok_or_else(|| PlacesError::Api("place details missing from response".to_string()))
    }
}
