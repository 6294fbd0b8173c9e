//! Glade: timeline playback for Understory audio packs
//!
//! Plays a set of generated audio cues in sync against a video's timeline.
//! There is no video window; the video is represented by a monotonic
//! [`Transport`] clock, and each cue is a timer that fires when the clock
//! reaches the cue's offset.
//!
//! The pieces:
//!
//! - **Transport** - start/pause/stop/seek clock in the seconds domain, with
//!   an optional total duration (the video length)
//! - **AudioOutput / AudioHandle** - the seam to actual sound. [`RodioOutput`]
//!   plays through the default device, [`NullOutput`] is silence for mute
//!   runs, [`RecordingOutput`] captures timings for tests
//! - **CueEngine** - the session state machine. Owns the registries of live
//!   audio handles and timer tasks; an epoch counter makes stop final even
//!   when timers are already in flight
//! - **AuditionDeck** - one-at-a-time variation preview, toggle semantics

pub mod audition;
pub mod engine;
pub mod output;
pub mod transport;

pub use audition::{Audition, AuditionDeck};
pub use engine::{Cue, CueEngine, CuePlan, EngineConfig, PlayError, SessionState};
pub use output::{
    AudioHandle, AudioOutput, NullOutput, OutputError, OutputStream, RecordingOutput, RodioOutput,
};
pub use transport::Transport;
