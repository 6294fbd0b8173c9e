//! The export queue itself.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forage::{AudioFetcher, ForageError};
use thiserror::Error;
use underproto::{AudioEvent, Selections};

use crate::names;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

/// One file to write: where it comes from and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
    pub file_name: String,
    pub url: String,
}

/// An item the queue could not finish. The queue keeps going, so a report
/// can hold several of these.
#[derive(Debug, Clone)]
pub struct ExportFailure {
    pub file_name: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub saved: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build the export list for a full pack: one item per event that has a
/// chosen variation, named after the event and its kind.
pub fn pack_items(events: &[AudioEvent], selections: &Selections) -> Vec<ExportItem> {
    events
        .iter()
        .filter_map(|event| {
            selections.chosen(&event.name).map(|url| ExportItem {
                file_name: names::pack_file_name(&event.name, event.kind),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Downloads items one at a time, pausing between consecutive items.
pub struct ExportQueue {
    fetcher: AudioFetcher,
    item_delay: Duration,
}

impl ExportQueue {
    pub fn new(fetcher: AudioFetcher, item_delay: Duration) -> Self {
        Self { fetcher, item_delay }
    }

    /// Work through `items`, writing each into `dest_dir`.
    ///
    /// A failed item lands in the report's `failures` and the queue
    /// continues with the next one. Only an unusable output directory
    /// aborts the whole run.
    pub async fn run(
        &self,
        items: Vec<ExportItem>,
        dest_dir: &Path,
    ) -> Result<ExportReport, ExportError> {
        self.run_with(items, dest_dir, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `progress` with the zero-based
    /// position of each item as it starts.
    pub async fn run_with(
        &self,
        items: Vec<ExportItem>,
        dest_dir: &Path,
        mut progress: impl FnMut(usize, &ExportItem),
    ) -> Result<ExportReport, ExportError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|source| ExportError::CreateDir {
                path: dest_dir.to_path_buf(),
                source,
            })?;

        let total = items.len();
        let mut report = ExportReport::default();
        for (position, item) in items.into_iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.item_delay).await;
            }
            progress(position, &item);
            tracing::info!(
                file = %item.file_name,
                item = position + 1,
                total,
                "exporting"
            );
            match self.export_one(&item, dest_dir).await {
                Ok(path) => report.saved.push(path),
                Err(e) => {
                    tracing::error!(
                        file = %item.file_name,
                        error = %e,
                        "export failed, continuing with the rest"
                    );
                    report.failures.push(ExportFailure {
                        file_name: item.file_name,
                        url: item.url,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    async fn export_one(&self, item: &ExportItem, dest_dir: &Path) -> Result<PathBuf, ForageError> {
        let audio = self.fetcher.fetch(&item.url).await?;
        let path = dest_dir.join(&item.file_name);
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|source| ForageError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use underproto::{EventKind, EventTiming};

    fn event(name: &str, kind: EventKind, variations: &[&str]) -> AudioEvent {
        AudioEvent {
            name: name.to_string(),
            kind,
            variations: variations.iter().map(|v| v.to_string()).collect(),
            timing: EventTiming::default(),
        }
    }

    #[test]
    fn pack_items_skip_unselected_events() {
        let events = vec![
            event("Wind", EventKind::Loop, &["http://a/w0.wav", "http://a/w1.wav"]),
            event("Door", EventKind::Emitter, &["http://a/d0.wav"]),
        ];
        let mut selections = Selections::first_variations(&events);
        selections.deselect("Door");

        let items = pack_items(&events, &selections);
        assert_eq!(
            items,
            vec![ExportItem {
                file_name: "Wind_LOOP.wav".to_string(),
                url: "http://a/w0.wav".to_string(),
            }]
        );
    }

    #[test]
    fn pack_items_follow_the_chosen_variation() {
        let events = vec![event(
            "Wind",
            EventKind::Loop,
            &["http://a/w0.wav", "http://a/w1.wav"],
        )];
        let mut selections = Selections::first_variations(&events);
        selections.select(&events[0], 1).unwrap();

        let items = pack_items(&events, &selections);
        assert_eq!(items[0].url, "http://a/w1.wav");
    }
}
