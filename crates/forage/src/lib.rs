//! forage - HTTP clients for Understory's remote pieces.
//!
//! Three small clients, one error type:
//!
//! - [`GenerationClient`] talks to the generation service's `/api/process`
//!   endpoint and hands back the event list.
//! - [`AssetStore`] uploads a local video and returns its public URL.
//! - [`AudioFetcher`] downloads variation audio as in-memory bytes for
//!   auditioning, playback arming, and export.
//!
//! None of these retry. A failed call surfaces as a [`ForageError`] and the
//! caller decides what the user sees.

pub mod assets;
pub mod fetch;
pub mod generation;

pub use assets::AssetStore;
pub use fetch::AudioFetcher;
pub use generation::GenerationClient;

use std::path::PathBuf;

/// Errors from any forage client.
#[derive(Debug, thiserror::Error)]
pub enum ForageError {
    /// Connection-level failure (DNS, refused, timeout, mangled body).
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The generation service answered 200 but flagged the run as failed.
    #[error("generation service reported status '{0}'")]
    Generation(String),

    /// The body did not match the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local file access failed before anything left the machine.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
