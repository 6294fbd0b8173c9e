//! Generated audio events and the `/api/process` wire pair.
//!
//! The generation service analyzes a video plus a user prompt and returns a
//! list of audio events. Each event carries several candidate variation URLs;
//! the rest of the system never re-requests or mutates them.

use serde::{Deserialize, Serialize};

use crate::DEFAULT_EVENT_DURATION_SECS;

/// How an event behaves on the timeline.
///
/// Spelled in uppercase on the wire (`"LOOP"` / `"EMITTER"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// Background bed: starts at its offset and retriggers every loop period
    /// until the session stops.
    Loop,
    /// One-shot: plays exactly once at its offset.
    Emitter,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Loop => "LOOP",
            EventKind::Emitter => "EMITTER",
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, EventKind::Loop)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event sits on the video timeline.
///
/// The service nests this under `metadata` and repeats the event's name and
/// type inside it; those duplicates are ignored here. `start` defaults to the
/// head of the video when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTiming {
    /// Offset from the start of the video, in seconds.
    #[serde(default)]
    pub start: f64,
    /// Nominal length of the event in seconds, when the service provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// The per-event prompt the service synthesized audio from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_prompt: Option<String>,
}

impl EventTiming {
    /// Duration for preview windows and display, falling back when the
    /// service omitted one.
    pub fn duration_or_default(&self) -> f64 {
        self.duration.unwrap_or(DEFAULT_EVENT_DURATION_SECS)
    }
}

/// One generated audio event with its candidate variations.
///
/// `name` is the unique key for the event everywhere downstream (selections,
/// cue registries, export file names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Ordered variation URLs. The service currently produces three per
    /// event, but nothing here depends on the count.
    pub variations: Vec<String>,
    #[serde(rename = "metadata", default)]
    pub timing: EventTiming,
}

impl AudioEvent {
    /// Variation URL at `index`, if in range.
    pub fn variation(&self, index: usize) -> Option<&str> {
        self.variations.get(index).map(String::as_str)
    }
}

/// Request body for `POST /api/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub video_url: String,
    pub user_prompt: String,
}

/// Response envelope from `POST /api/process`.
///
/// The service reports failures inside a 200 as well, so callers must check
/// `status` and not just the HTTP code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<Vec<AudioEvent>>,
}

impl ProcessResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
