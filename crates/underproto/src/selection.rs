//! The user's variation choices, one per event.
//!
//! A selection maps an event name to the chosen variation URL. Pack export
//! and timeline playback both require a complete set (every event selected);
//! auditioning and single downloads do not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::AudioEvent;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("event '{event}' has no variation {index} ({available} available)")]
    OutOfRange {
        event: String,
        index: usize,
        available: usize,
    },
}

/// Chosen variation URL per event name.
///
/// At most one entry per event; selecting again replaces the previous choice.
/// Stored as a sorted map so the session manifest serializes stably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections {
    chosen: BTreeMap<String, String>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event's first variation, the starting point after generation.
    ///
    /// Events with an empty variation list get no entry and keep the set
    /// incomplete.
    pub fn first_variations(events: &[AudioEvent]) -> Self {
        let mut selections = Self::new();
        for event in events {
            if let Some(url) = event.variation(0) {
                selections.chosen.insert(event.name.clone(), url.to_string());
            }
        }
        selections
    }

    /// Choose `index` for `event`, replacing any previous choice.
    pub fn select(&mut self, event: &AudioEvent, index: usize) -> Result<(), SelectionError> {
        let url = event
            .variation(index)
            .ok_or_else(|| SelectionError::OutOfRange {
                event: event.name.clone(),
                index,
                available: event.variations.len(),
            })?;
        self.chosen.insert(event.name.clone(), url.to_string());
        Ok(())
    }

    /// Drop the choice for `name`. Returns whether one existed.
    pub fn deselect(&mut self, name: &str) -> bool {
        self.chosen.remove(name).is_some()
    }

    /// The chosen URL for `name`, if any.
    pub fn chosen(&self, name: &str) -> Option<&str> {
        self.chosen.get(name).map(String::as_str)
    }

    /// Which variation index the current choice corresponds to.
    ///
    /// `None` when nothing is chosen or the stored URL no longer appears in
    /// the event's variation list.
    pub fn chosen_index(&self, event: &AudioEvent) -> Option<usize> {
        let url = self.chosen.get(&event.name)?;
        event.variations.iter().position(|v| v == url)
    }

    /// True once every event has a choice. An empty event list is never
    /// complete; there is nothing to play or export.
    pub fn is_complete(&self, events: &[AudioEvent]) -> bool {
        !events.is_empty() && events.iter().all(|e| self.chosen.contains_key(&e.name))
    }

    /// Event names still lacking a choice, in event order.
    pub fn missing<'a>(&self, events: &'a [AudioEvent]) -> Vec<&'a str> {
        events
            .iter()
            .filter(|e| !self.chosen.contains_key(&e.name))
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// (event name, chosen URL) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.chosen.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
