//! The on-disk session record.
//!
//! `generate` writes a manifest; `events`, `select`, `audition`, `play`,
//! `export`, and the interactive workspace all operate on it. It is the only
//! state handed between commands, so losing it means regenerating the pack.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::event::AudioEvent;
use crate::selection::Selections;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("session file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A generated session: the source video, the events the service produced,
/// and the user's variation choices so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Public URL of the uploaded video, as sent to the generation service.
    pub video_url: String,
    /// Local path the video was uploaded from, when it came from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
    /// Probed video length in seconds. `None` disables the natural-end stop
    /// during playback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_duration_secs: Option<f64>,
    pub prompt: String,
    pub events: Vec<AudioEvent>,
    #[serde(default)]
    pub selections: Selections,
}

impl SessionManifest {
    /// A fresh session with every event's first variation pre-selected.
    pub fn new(video_url: String, prompt: String, events: Vec<AudioEvent>) -> Self {
        let selections = Selections::first_variations(&events);
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            video_url,
            video_path: None,
            video_duration_secs: None,
            prompt,
            events,
            selections,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        // Serialization of our own types cannot fail; io can.
        let text = serde_json::to_string_pretty(self).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up an event by name.
    pub fn event(&self, name: &str) -> Option<&AudioEvent> {
        self.events.iter().find(|e| e.name == name)
    }

    /// True once every event has a selected variation.
    pub fn all_selected(&self) -> bool {
        self.selections.is_complete(&self.events)
    }
}
