//! Client for the asset store that hosts uploaded videos.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::ForageError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Uploads local videos and returns their public URLs.
///
/// The generation service only accepts URLs it can GET, so a video on disk
/// goes through the store first. Raw octet-stream POST with the original
/// file name in a header; the store answers `{"url": "..."}`.
pub struct AssetStore {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl AssetStore {
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

    /// Upload the video at `path`, returning the public URL the store
    /// assigned it.
    #[tracing::instrument(skip(self), fields(store.url = %self.base_url))]
    pub async fn upload_video(&self, path: &Path) -> Result<String, ForageError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ForageError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.mp4")
            .to_string();

        tracing::debug!(bytes = data.len(), file = %file_name, "uploading video");

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .timeout(self.timeout)
            .header("content-type", "application/octet-stream")
            .header("x-file-name", &file_name)
            .body(data)
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

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| ForageError::Protocol(format!("invalid upload response: {}", e)))?;

        tracing::info!(url = %parsed.url, "video uploaded");
        Ok(parsed.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trailing_slash_stripped() {
        let store = AssetStore::new("http://localhost:8787/");
        assert_eq!(store.base_url(), "http://localhost:8787");
    }
}
