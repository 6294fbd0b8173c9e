//! Downloading variation audio.

use bytes::Bytes;
use reqwest::Client;

use crate::ForageError;

/// Fetches variation audio into memory.
///
/// Variations are short clips, so whole-body buffering is fine and keeps the
/// playback side free of streaming concerns.
#[derive(Clone)]
pub struct AudioFetcher {
    client: Client,
}

impl AudioFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes, ForageError> {
        let response = self
            .client
            .get(url)
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

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ForageError::Transport(e.to_string()))?;

        tracing::debug!(bytes = bytes.len(), "fetched audio");
        Ok(bytes)
    }
}

impl Default for AudioFetcher {
    fn default() -> Self {
        Self::new()
    }
}
