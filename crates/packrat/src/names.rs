//! File naming for exported audio.

use underproto::EventKind;

/// Strip path separators out of an event name so it cannot escape the
/// output directory.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// Name for an event's chosen variation in a full pack export.
pub fn pack_file_name(event_name: &str, kind: EventKind) -> String {
    format!("{}_{}.wav", sanitize(event_name), kind.as_str())
}

/// Name for a single downloaded variation. `index` is zero-based; the file
/// name counts from one.
pub fn variation_file_name(event_name: &str, index: usize) -> String {
    format!("{}_variation_{}.wav", sanitize(event_name), index + 1)
}
