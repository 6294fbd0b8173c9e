//! Video metadata probing.

use std::io::{BufReader, Cursor};
use std::path::Path;

use mp4::Mp4Reader;

/// Length of an mp4 video in seconds.
///
/// Anything that goes wrong (unreadable file, not an mp4, truncated header)
/// degrades to `None`: playback then has no natural end and runs until
/// stopped by hand.
pub fn probe_duration_secs(path: &Path) -> Option<f64> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read video file");
            return None;
        }
    };

    let size = data.len() as u64;
    match Mp4Reader::read_header(BufReader::new(Cursor::new(data)), size) {
        Ok(mp4) => {
            let secs = mp4.duration().as_secs_f64();
            tracing::debug!(path = %path.display(), secs, "probed video duration");
            Some(secs)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not probe video duration, playback will have no natural end"
            );
            None
        }
    }
}
