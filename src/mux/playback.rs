//! Playback readiness probing and video retrieval.
//!
//! A freshly uploaded video is not immediately playable: the host transcodes
//! it in the background and the public MP4 URL serves errors until the
//! rendition exists. Callers probe that URL under a bounded retry policy and
//! only fetch the full payload once it answers.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{BackoffKind, MuxConfig, RetryConfig};

/// Cap on exponentially grown delays
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Errors from probing or fetching a playback URL
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("video {playback_id} not ready after {attempts} attempts")]
    NotReady { playback_id: String, attempts: u32 },

    #[error("playback request rejected with HTTP {status}")]
    Permanent { status: u16 },
}

/// Bounded retry policy for requests against the video host.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: BackoffKind,
}

impl RetryPolicy {
    /// Constant-delay policy
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: BackoffKind::Fixed,
        }
    }

    /// Delay to sleep after the given 1-based attempt number
    fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            BackoffKind::Fixed => self.delay,
            BackoffKind::Exponential => {
                let shift = attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul(1u32 << shift).min(MAX_BACKOFF)
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
            backoff: config.backoff,
        }
    }
}

/// Client for the public playback side of the video host.
///
/// Probing and fetching carry independent retry budgets: the probe ceiling is
/// higher because each attempt is headers-only.
#[derive(Clone)]
pub struct PlaybackClient {
    http: Client,
    stream_base_url: String,
    rendition: String,
    probe: RetryPolicy,
    fetch: RetryPolicy,
}

impl PlaybackClient {
    pub fn new(config: &MuxConfig) -> Self {
        let http = Client::builder()
            .user_agent(concat!("tour-sidecar/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            stream_base_url: config.stream_base_url.trim_end_matches('/').to_string(),
            rendition: config.rendition.clone(),
            probe: RetryPolicy::from(&config.probe),
            fetch: RetryPolicy::from(&config.fetch),
        }
    }

    /// Public MP4 URL for a playback id
    pub fn playback_url(&self, playback_id: &str) -> String {
        format!(
            "{}/{}/{}?download=true",
            self.stream_base_url, playback_id, self.rendition
        )
    }

    /// Probe the playback URL until it answers 2xx.
    ///
    /// A non-success status while the host is still transcoding is
    /// indistinguishable from a transient network error or a bad reference,
    /// so all of them retry. Auth rejections are the exception: no amount of
    /// waiting fixes those. Returns `PlaybackError::NotReady` once the budget
    /// is exhausted.
    pub async fn poll_until_ready(&self, playback_id: &str) -> Result<(), PlaybackError> {
        let url = self.playback_url(playback_id);
        let policy = &self.probe;

        for attempt in 1..=policy.max_attempts {
            match self.http.head(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(playback_id, attempt, "playback ready");
                    return Ok(());
                }
                Ok(resp) if is_permanent(resp.status()) => {
                    warn!(playback_id, status = %resp.status(), "playback probe rejected");
                    return Err(PlaybackError::Permanent {
                        status: resp.status().as_u16(),
                    });
                }
                Ok(resp) => {
                    debug!(playback_id, attempt, status = %resp.status(), "playback not ready");
                }
                Err(e) => {
                    debug!(playback_id, attempt, error = %e, "playback probe failed");
                }
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.delay_for(attempt)).await;
            }
        }

        Err(PlaybackError::NotReady {
            playback_id: playback_id.to_string(),
            attempts: policy.max_attempts,
        })
    }

    /// Fetch the full MP4 payload, retrying under the fetch budget.
    pub async fn fetch_video(&self, playback_id: &str) -> Result<Vec<u8>, PlaybackError> {
        let url = self.playback_url(playback_id);
        let policy = &self.fetch;

        for attempt in 1..=policy.max_attempts {
            match self.http.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                    Ok(body) => {
                        debug!(playback_id, attempt, bytes = body.len(), "video fetched");
                        return Ok(body.to_vec());
                    }
                    Err(e) => {
                        debug!(playback_id, attempt, error = %e, "video body read failed");
                    }
                },
                Ok(resp) if is_permanent(resp.status()) => {
                    warn!(playback_id, status = %resp.status(), "video fetch rejected");
                    return Err(PlaybackError::Permanent {
                        status: resp.status().as_u16(),
                    });
                }
                Ok(resp) => {
                    debug!(playback_id, attempt, status = %resp.status(), "video not available");
                }
                Err(e) => {
                    debug!(playback_id, attempt, error = %e, "video fetch failed");
                }
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.delay_for(attempt)).await;
            }
        }

        Err(PlaybackError::NotReady {
            playback_id: playback_id.to_string(),
            attempts: policy.max_attempts,
        })
    }
}

/// Statuses that retrying cannot fix: the credentials or URL signing are
/// wrong, not the transcoding state.
fn is_permanent(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_url_format() {
        let client = PlaybackClient::new(&MuxConfig::default());
        assert_eq!(
            client.playback_url("abc123"),
            "https://stream.mux.com/abc123/capped-1080p.mp4?download=true"
        );
    }

    #[test]
    fn test_playback_url_trims_trailing_slash() {
        let config = MuxConfig {
            stream_base_url: "http://127.0.0.1:9000/".to_string(),
            ..MuxConfig::default()
        };
        let client = PlaybackClient::new(&config);
        assert_eq!(
            client.playback_url("x"),
            "http://127.0.0.1:9000/x/capped-1080p.mp4?download=true"
        );
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let policy = RetryPolicy::fixed(10, Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(9), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            delay: Duration::from_secs(2),
            backoff: BackoffKind::Exponential,
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for(32), Duration::from_secs(30));
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 7,
            delay_ms: 250,
            backoff: BackoffKind::Fixed,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_permanent_statuses() {
        assert!(is_permanent(StatusCode::UNAUTHORIZED));
        assert!(is_permanent(StatusCode::FORBIDDEN));
        assert!(!is_permanent(StatusCode::NOT_FOUND));
        assert!(!is_permanent(StatusCode::SERVICE_UNAVAILABLE));
    }
}
