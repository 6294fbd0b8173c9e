//! Client for the generation service.

use std::time::Duration;

use reqwest::Client;
use underproto::{AudioEvent, ProcessRequest, ProcessResponse};

use crate::ForageError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for `POST /api/process`.
///
/// One call per session: video URL plus prompt in, the full event list out.
/// Generation is slow, so the default timeout is generous.
pub struct GenerationClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl GenerationClient {
    /// Create a client for the given service base URL.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service to analyze `video_url` under `prompt` and plan the
    /// audio events.
    ///
    /// The service reports failures two ways: a non-2xx status, or a 2xx
    /// whose envelope carries `status != "success"`. Both come back as
    /// errors here; a success always has events.
    #[tracing::instrument(skip(self, prompt), fields(service.url = %self.base_url))]
    pub async fn request_asset_pack(
        &self,
        video_url: &str,
        prompt: &str,
    ) -> Result<Vec<AudioEvent>, ForageError> {
        let request = ProcessRequest {
            video_url: video_url.to_string(),
            user_prompt: prompt.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/process", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForageError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ProcessResponse = response
            .json()
            .await
            .map_err(|e| ForageError::Protocol(format!("invalid process response: {}", e)))?;

        if !envelope.is_success() {
            return Err(ForageError::Generation(envelope.status));
        }

        let events = envelope
            .data
            .ok_or_else(|| ForageError::Protocol("success response without data".into()))?;

        tracing::info!(events = events.len(), "generation service returned asset pack");
        Ok(events)
    }
}
