//! Export: turn a session's selections into .wav files on disk.
//!
//! The queue is deliberately sequential. Asset URLs all point at the same
//! small store, and hammering it with parallel downloads is how the store
//! falls over; one item at a time with a short pause between items keeps it
//! happy. A failed item is recorded and the queue moves on, so one dead URL
//! cannot sink the rest of the pack.

pub mod names;
pub mod queue;

pub use names::{pack_file_name, sanitize, variation_file_name};
pub use queue::{pack_items, ExportError, ExportFailure, ExportItem, ExportQueue, ExportReport};
