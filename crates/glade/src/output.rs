//! The seam between cue scheduling and actual sound.
//!
//! The engine never touches an audio device directly; it asks an
//! [`AudioOutput`] for a handle and drives that. [`RodioOutput`] is the real
//! device, [`NullOutput`] is silence for mute runs, and [`RecordingOutput`]
//! captures what would have played and when, for the scheduler tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use thiserror::Error;
use tokio::time::Instant;

// Callers keep the stream alive; re-exported so they can name it.
pub use rodio::OutputStream;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no audio output device: {0}")]
    Device(String),

    #[error("could not decode audio for '{label}': {message}")]
    Decode { label: String, message: String },
}

/// Creates playing audio handles. `start` begins playback immediately.
pub trait AudioOutput: Send + Sync {
    fn start(&self, label: &str, audio: Bytes) -> Result<Box<dyn AudioHandle>, OutputError>;
}

/// One playing (or played) clip.
pub trait AudioHandle: Send {
    /// Rewind to the beginning and play again. Used for loop retriggers.
    fn replay(&mut self);

    /// Stop playback and discard the remaining audio.
    fn halt(&mut self);

    /// Whether the clip ran to its natural end.
    fn is_finished(&self) -> bool;
}

// ============================================================================
// RodioOutput - the default audio device
// ============================================================================

/// Plays through the default output device.
///
/// Holds a clone of the stream's mixer; the [`OutputStream`] itself is not
/// `Send`, so [`RodioOutput::open`] hands it back to the caller, who must
/// keep it alive for as long as anything should be audible.
pub struct RodioOutput {
    mixer: rodio::mixer::Mixer,
}

impl RodioOutput {
    /// Open the default output device.
    ///
    /// Dropping the returned stream silences every handle created from this
    /// output, so keep it on the main thread for the life of the command.
    pub fn open() -> Result<(Self, OutputStream), OutputError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| OutputError::Device(e.to_string()))?;
        let mixer = stream.mixer().clone();
        Ok((Self { mixer }, stream))
    }
}

impl AudioOutput for RodioOutput {
    fn start(&self, label: &str, audio: Bytes) -> Result<Box<dyn AudioHandle>, OutputError> {
        let decoder = Decoder::new(Cursor::new(audio.clone())).map_err(|e| OutputError::Decode {
            label: label.to_string(),
            message: e.to_string(),
        })?;

        let sink = Sink::connect_new(&self.mixer);
        sink.append(decoder);
        sink.play();

        Ok(Box::new(RodioHandle { sink, audio }))
    }
}

struct RodioHandle {
    sink: Sink,
    /// Kept for replay; decoding is cheap, re-fetching is not.
    audio: Bytes,
}

impl AudioHandle for RodioHandle {
    fn replay(&mut self) {
        self.sink.stop();
        match Decoder::new(Cursor::new(self.audio.clone())) {
            Ok(decoder) => {
                self.sink.append(decoder);
                self.sink.play();
            }
            Err(e) => {
                // Decoded fine the first time, so this is unexpected.
                tracing::warn!(error = %e, "replay decode failed");
            }
        }
    }

    fn halt(&mut self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

// ============================================================================
// NullOutput - silence
// ============================================================================

/// Output that produces no sound. Used for `--mute` runs and environments
/// with no audio device.
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn start(&self, _label: &str, _audio: Bytes) -> Result<Box<dyn AudioHandle>, OutputError> {
        Ok(Box::new(NullHandle))
    }
}

struct NullHandle;

impl AudioHandle for NullHandle {
    fn replay(&mut self) {}

    fn halt(&mut self) {}

    fn is_finished(&self) -> bool {
        // Nothing plays, so nothing is ever pending.
        true
    }
}

// ============================================================================
// RecordingOutput - capture for tests
// ============================================================================

/// What a [`RecordingOutput`] handle was asked to do, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputAction {
    Start,
    Replay,
    Halt,
}

/// One recorded output call.
#[derive(Debug, Clone)]
pub struct OutputEvent {
    pub label: String,
    pub action: OutputAction,
    /// Elapsed virtual time since the output was created.
    pub at: Duration,
}

#[derive(Default)]
struct RecordedHandleState {
    finished: bool,
}

/// In-memory output that records every start, replay, and halt with a
/// timestamp. Under a paused tokio runtime the timestamps are exact, which
/// is what the scheduler tests assert on.
#[derive(Clone)]
pub struct RecordingOutput {
    origin: Instant,
    log: Arc<Mutex<Vec<OutputEvent>>>,
    handles: Arc<Mutex<HashMap<String, Arc<Mutex<RecordedHandleState>>>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            log: Arc::new(Mutex::new(Vec::new())),
            handles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// All recorded events in order.
    pub fn events(&self) -> Vec<OutputEvent> {
        self.log.lock().unwrap().clone()
    }

    /// (label, time) of every `start` call.
    pub fn starts(&self) -> Vec<(String, Duration)> {
        self.of_kind(OutputAction::Start)
    }

    /// (label, time) of every `replay` call.
    pub fn replays(&self) -> Vec<(String, Duration)> {
        self.of_kind(OutputAction::Replay)
    }

    /// (label, time) of every `halt` call.
    pub fn halts(&self) -> Vec<(String, Duration)> {
        self.of_kind(OutputAction::Halt)
    }

    /// Mark the latest handle for `label` as naturally finished.
    pub fn finish(&self, label: &str) {
        if let Some(state) = self.handles.lock().unwrap().get(label) {
            state.lock().unwrap().finished = true;
        }
    }

    fn of_kind(&self, action: OutputAction) -> Vec<(String, Duration)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == action)
            .map(|e| (e.label.clone(), e.at))
            .collect()
    }

    fn record(&self, label: &str, action: OutputAction) {
        self.log.lock().unwrap().push(OutputEvent {
            label: label.to_string(),
            action,
            at: self.origin.elapsed(),
        });
    }
}

impl Default for RecordingOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RecordingOutput {
    fn start(&self, label: &str, _audio: Bytes) -> Result<Box<dyn AudioHandle>, OutputError> {
        self.record(label, OutputAction::Start);
        let state = Arc::new(Mutex::new(RecordedHandleState::default()));
        self.handles
            .lock()
            .unwrap()
            .insert(label.to_string(), state.clone());
        Ok(Box::new(RecordingHandle {
            label: label.to_string(),
            output: self.clone(),
            state,
        }))
    }
}

struct RecordingHandle {
    label: String,
    output: RecordingOutput,
    state: Arc<Mutex<RecordedHandleState>>,
}

impl AudioHandle for RecordingHandle {
    fn replay(&mut self) {
        self.output.record(&self.label, OutputAction::Replay);
        self.state.lock().unwrap().finished = false;
    }

    fn halt(&mut self) {
        self.output.record(&self.label, OutputAction::Halt);
    }

    fn is_finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }
}
