//! underproto - Domain and wire types for the Understory workbench
//!
//! This crate defines the types shared by every other Understory crate:
//!
//! - `AudioEvent` / `EventKind` / `EventTiming` - the generation service's
//!   event model (looping beds and one-shot emitters, each with a list of
//!   candidate variation URLs)
//! - `ProcessRequest` / `ProcessResponse` - the `/api/process` wire pair
//! - `Selections` - the user's variation choices, one per event
//! - `SessionManifest` - the on-disk session record that carries a generated
//!   pack from the workspace commands to playback and export
//!
//! Wire compatibility notes: the service spells `EventKind` in uppercase
//! (`"LOOP"`, `"EMITTER"`), nests timing under a `metadata` object that also
//! repeats the event name and type, and may omit `start`/`duration` entirely.
//! The types here accept all of that and ignore fields they don't model.

pub mod event;
pub mod manifest;
pub mod selection;

pub use event::{AudioEvent, EventKind, EventTiming, ProcessRequest, ProcessResponse};
pub use manifest::{ManifestError, SessionManifest};
pub use selection::{SelectionError, Selections};

/// Fallback event duration in seconds when the service omitted one.
///
/// Used for preview windows and display; playback of the audio itself is
/// never truncated to this.
pub const DEFAULT_EVENT_DURATION_SECS: f64 = 5.0;
