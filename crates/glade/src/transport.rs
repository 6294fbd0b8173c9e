//! Monotonic transport clock.
//!
//! Advances playback position based on wall clock time, standing in for the
//! video element's clock. Uses `tokio::time::Instant`, so tests under a
//! paused runtime control it exactly.

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic clock tracking the playback position in seconds.
///
/// When playing, the clock stores the `start_instant` (when play was pressed)
/// and `start_position` (the position at that moment). The current position
/// is start position plus elapsed wall time.
#[derive(Debug)]
pub struct Transport {
    /// When play was pressed (None if paused/stopped)
    start_instant: Option<Instant>,

    /// Position when play was pressed
    start_position: Duration,

    /// Current position (updated by tick())
    current_position: Duration,

    /// Total length of the video, when known
    duration: Option<Duration>,
}

impl Transport {
    /// Create a new transport at position 0 with no known end.
    pub fn new() -> Self {
        Self {
            start_instant: None,
            start_position: Duration::ZERO,
            current_position: Duration::ZERO,
            duration: None,
        }
    }

    /// Total video length, when known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
    }

    /// Start the clock from current position
    pub fn start(&mut self) {
        if self.start_instant.is_none() {
            self.start_instant = Some(Instant::now());
            self.start_position = self.current_position;
        }
    }

    /// Check if clock is running
    pub fn is_running(&self) -> bool {
        self.start_instant.is_some()
    }

    /// Pause without resetting position
    pub fn pause(&mut self) {
        if self.start_instant.is_some() {
            // Update current position before pausing
            self.tick();
            self.start_instant = None;
        }
    }

    /// Stop and reset to zero
    pub fn stop(&mut self) {
        self.start_instant = None;
        self.start_position = Duration::ZERO;
        self.current_position = Duration::ZERO;
    }

    /// Seek to position
    pub fn seek(&mut self, position: Duration) {
        let was_running = self.start_instant.is_some();
        self.current_position = position;
        self.start_position = position;

        if was_running {
            // Reset start instant so elapsed time starts from now
            self.start_instant = Some(Instant::now());
        }
    }

    /// Called by poll loops - advances position based on elapsed time.
    ///
    /// Returns the current position.
    pub fn tick(&mut self) -> Duration {
        let Some(start) = self.start_instant else {
            return self.current_position;
        };

        self.current_position = self.start_position + start.elapsed();
        self.current_position
    }

    /// Get current position
    pub fn position(&self) -> Duration {
        self.current_position
    }

    /// Whether the position has reached the end of the video.
    ///
    /// Always false when the duration is unknown.
    pub fn is_finished(&self) -> bool {
        match self.duration {
            Some(total) => self.current_position >= total,
            None => false,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
