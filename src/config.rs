use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables.
///
/// All settings can be configured via environment variables with the `TOUR_`
/// prefix. For example: `TOUR_SERVER__PORT=8097`,
/// `TOUR_GEMINI__API_KEY=...`, `TOUR_MUX__PROBE__MAX_ATTEMPTS=50`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Mux video host configuration
    #[serde(default)]
    pub mux: MuxConfig,

    /// Gemini inference configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Google Places configuration
    #[serde(default)]
    pub places: PlacesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8097
}

impl ServerConfig {
    /// Returns the socket address for binding the server
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MuxConfig {
    /// Access token ID for the Mux API
    #[serde(default)]
    pub token_id: String,

    /// Access token secret for the Mux API
    #[serde(default)]
    pub token_secret: String,

    /// Base URL for the Mux management API
    #[serde(default = "default_mux_api_base_url")]
    pub api_base_url: String,

    /// Base URL for public playback streams
    #[serde(default = "default_mux_stream_base_url")]
    pub stream_base_url: String,

    /// MP4 rendition name appended to the playback URL
    #[serde(default = "default_rendition")]
    pub rendition: String,

    /// Retry budget for the cheap readiness probe
    #[serde(default = "default_probe_retry")]
    pub probe: RetryConfig,

    /// Retry budget for full video byte fetches
    #[serde(default = "default_fetch_retry")]
    pub fetch: RetryConfig,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            token_id: String::new(),
            token_secret: String::new(),
            api_base_url: default_mux_api_base_url(),
            stream_base_url: default_mux_stream_base_url(),
            rendition: default_rendition(),
            probe: default_probe_retry(),
            fetch: default_fetch_retry(),
        }
    }
}

fn default_mux_api_base_url() -> String {
    "https://api.mux.com".to_string()
}

fn default_mux_stream_base_url() -> String {
    "https://stream.mux.com".to_string()
}

fn default_rendition() -> String {
    "capped-1080p.mp4".to_string()
}

fn default_probe_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 100,
        delay_ms: 2000,
        backoff: BackoffKind::Fixed,
    }
}

fn default_fetch_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 10,
        delay_ms: 2000,
        backoff: BackoffKind::Fixed,
    }
}

/// Retry budget for calls against the video host.
///
/// The probe budget is higher than the fetch budget because a probe is a
/// headers-only request while a fetch pulls the whole rendition.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before giving up
    pub max_attempts: u32,

    /// Base delay between attempts in milliseconds
    pub delay_ms: u64,

    /// Delay growth strategy between attempts
    #[serde(default)]
    pub backoff: BackoffKind,
}

/// Delay growth strategy for retries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Constant delay between attempts (observed upstream behavior)
    #[default]
    Fixed,
    /// Delay doubles per attempt, capped at 30 seconds
    Exponential,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key for the Gemini API
    #[serde(default)]
    pub api_key: String,

    /// Base URL for the Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model used for video analysis
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling bound
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling bound
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Output length ceiling, generous enough for dozens of room entries
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    /// API key for the Google Places API
    #[serde(default)]
    pub api_key: String,

    /// Base URL for the Places API
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_places_base_url(),
        }
    }
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables should be prefixed with `TOUR_` and use
    /// double underscores for nested values:
    /// - `TOUR_GEMINI__API_KEY` -> gemini.api_key
    /// - `TOUR_MUX__TOKEN_ID` -> mux.token_id
    /// - `TOUR_SERVER__PORT` -> server.port
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TOUR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate process-wide preconditions before serving traffic.
    ///
    /// Missing upstream credentials fail here, at startup, rather than on the
    /// first request that needs them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key.is_empty() {
            return Err(ConfigError::Message(
                "gemini.api_key is required (TOUR_GEMINI__API_KEY)".to_string(),
            ));
        }
        if self.mux.token_id.is_empty() || self.mux.token_secret.is_empty() {
            return Err(ConfigError::Message(
                "mux credentials are required (TOUR_MUX__TOKEN_ID, TOUR_MUX__TOKEN_SECRET)"
                    .to_string(),
            ));
        }
        if self.mux.probe.max_attempts == 0 || self.mux.fetch.max_attempts == 0 {
            return Err(ConfigError::Message(
                "retry budgets must allow at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}
