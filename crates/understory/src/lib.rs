//! understory - terminal workbench for generated game audio asset packs
//!
//! This library backs the `understory` binary:
//! - `commands`: one function per subcommand
//! - `media`: mp4 duration probing
//! - `render`: terminal output (banner, event table, progress bars)
//! - `workspace`: the interactive event/variation loop

pub mod commands;
pub mod media;
pub mod render;
pub mod workspace;
