//! understory - turn an environment video and a prompt into a playable,
//! exportable game audio asset pack.
//!
//! Subcommands:
//! - `understory generate --video <file> --prompt <text>` - start a session
//! - `understory events` / `select` / `deselect` - inspect and pick variations
//! - `understory audition` / `preview` / `play` - hear them
//! - `understory export` / `download` - write .wav files to disk
//! - `understory workspace` - interactive browser over all of the above

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use underconf::UnderstoryConfig;
use understory::{commands, render, workspace};

#[derive(Parser)]
#[command(name = "understory")]
#[command(about = "Game audio asset pack workbench")]
#[command(version)]
struct Cli {
    /// Session manifest path (defaults to the configured location)
    #[arg(long, global = true, env = "UNDERSTORY_SESSION")]
    session: Option<PathBuf>,

    /// Extra config file, read after system and user config
    #[arg(long, global = true, env = "UNDERSTORY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video, generate an asset pack, start a session
    Generate {
        /// Environment video file
        #[arg(long)]
        video: PathBuf,

        /// Environment description (e.g. "Mystical forest with wind and birds")
        #[arg(long)]
        prompt: String,
    },

    /// List the session's events, timing, and selections
    Events,

    /// Choose a variation for an event (numbers start at 1)
    Select {
        /// Event name
        event: String,

        /// Variation number
        variation: usize,
    },

    /// Clear an event's selection
    Deselect {
        /// Event name
        event: String,
    },

    /// Play one variation on its own
    Audition {
        /// Event name
        event: String,

        /// Variation number (defaults to the selected one)
        variation: Option<usize>,

        /// Play silently
        #[arg(long)]
        mute: bool,
    },

    /// Play an event's chosen audio over its slice of the timeline
    Preview {
        /// Event name
        event: String,

        /// Play silently
        #[arg(long)]
        mute: bool,
    },

    /// Play the whole pack against the video timeline
    Play {
        /// Play silently
        #[arg(long)]
        mute: bool,
    },

    /// Export every selected variation as a .wav pack
    Export {
        /// Output directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download a single variation
    Download {
        /// Event name
        event: String,

        /// Variation number
        variation: usize,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Interactive event and variation browser
    Workspace {
        /// Audition silently
        #[arg(long)]
        mute: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let (config, sources) = UnderstoryConfig::load_with_sources_from(cli.config.as_deref())?;
    for path in &sources.files {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    for var in &sources.env_overrides {
        tracing::debug!(var = %var, "applied env override");
    }

    let session_path = cli
        .session
        .unwrap_or_else(|| PathBuf::from(&config.session.file));

    match cli.command {
        None => {
            render::landing();
        }
        Some(Commands::Generate { video, prompt }) => {
            commands::generate(&config, &session_path, &video, &prompt).await?;
        }
        Some(Commands::Events) => {
            commands::events(&session_path)?;
        }
        Some(Commands::Select { event, variation }) => {
            commands::select(&session_path, &event, variation)?;
        }
        Some(Commands::Deselect { event }) => {
            commands::deselect(&session_path, &event)?;
        }
        Some(Commands::Audition {
            event,
            variation,
            mute,
        }) => {
            commands::audition(&session_path, &event, variation, mute).await?;
        }
        Some(Commands::Preview { event, mute }) => {
            commands::preview(&config, &session_path, &event, mute).await?;
        }
        Some(Commands::Play { mute }) => {
            commands::play(&config, &session_path, mute).await?;
        }
        Some(Commands::Export { out }) => {
            commands::export(&config, &session_path, out.as_deref()).await?;
        }
        Some(Commands::Download {
            event,
            variation,
            out,
        }) => {
            commands::download(&config, &session_path, &event, variation, out.as_deref()).await?;
        }
        Some(Commands::Workspace { mute }) => {
            workspace::run(&config, &session_path, mute).await?;
        }
    }

    Ok(())
}
