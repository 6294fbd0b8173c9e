//! One-at-a-time variation auditioning.
//!
//! The deck holds at most one playing variation. Toggling the one that is
//! already playing stops it; toggling anything else stops the old one
//! before the new one starts, so two variations never overlap.

use std::sync::Arc;

use bytes::Bytes;

use crate::output::{AudioHandle, AudioOutput, OutputError};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audition {
    Started,
    Stopped,
}

struct CurrentAudition {
    event: String,
    index: usize,
    handle: Box<dyn AudioHandle>,
}

pub struct AuditionDeck {
    output: Arc<dyn AudioOutput>,
    current: Option<CurrentAudition>,
}

impl AuditionDeck {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            current: None,
        }
    }

    /// Toggle a variation. Returns [`Audition::Stopped`] when `event`/`index`
    /// was the one already playing, [`Audition::Started`] otherwise.
    pub fn toggle(
        &mut self,
        event: &str,
        index: usize,
        audio: Bytes,
    ) -> Result<Audition, OutputError> {
        if let Some(mut current) = self.current.take() {
            let was_same = current.event == event && current.index == index;
            let finished = current.handle.is_finished();
            current.handle.halt();
            // A finished variation toggles back on rather than off.
            if was_same && !finished {
                tracing::debug!(event, index, "audition toggled off");
                return Ok(Audition::Stopped);
            }
        }

        let label = format!("{event}-{index}");
        let handle = self.output.start(&label, audio)?;
        self.current = Some(CurrentAudition {
            event: event.to_string(),
            index,
            handle,
        });
        tracing::debug!(event, index, "audition started");
        Ok(Audition::Started)
    }

    /// The variation currently sounding, if any. A variation that played to
    /// its natural end no longer counts.
    pub fn playing(&mut self) -> Option<(&str, usize)> {
        let finished = self
            .current
            .as_ref()
            .map(|current| current.handle.is_finished())
            .unwrap_or(false);
        if finished {
            self.current = None;
        }
        self.current
            .as_ref()
            .map(|current| (current.event.as_str(), current.index))
    }

    pub fn stop(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.handle.halt();
        }
    }
}
