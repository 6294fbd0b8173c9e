//! Minimal configuration loading for Understory.
//!
//! Every knob the tools care about lives here: service endpoints, the loop
//! retrigger period, export pacing, and where the session file sits. The CLI
//! loads one `UnderstoryConfig` at startup and threads it through.
//!
//! # Usage
//!
//! ```rust,no_run
//! use underconf::UnderstoryConfig;
//!
//! let config = UnderstoryConfig::load().expect("failed to load config");
//! println!("generation service: {}", config.service.generation_url);
//! println!("loop period: {}s", config.playback.loop_period_secs);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/understory/config.toml` (system)
//! 2. `~/.config/understory/config.toml` (user)
//! 3. `./understory.toml` (local override, or the `--config` path)
//! 4. Environment variables (`UNDERSTORY_*`)
//!
//! # Example Config
//!
//! ```toml
//! [service]
//! generation_url = "http://127.0.0.1:8000"
//! timeout_secs = 120
//!
//! [assets]
//! store_url = "http://127.0.0.1:8787"
//!
//! [playback]
//! loop_period_secs = 10.0
//!
//! [export]
//! item_delay_ms = 500
//! output_dir = "pack"
//!
//! [session]
//! file = "understory-session.json"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use sections::{
    AssetsConfig, ExportConfig, PlaybackConfig, ServiceConfig, SessionConfig,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete Understory configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnderstoryConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl UnderstoryConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/understory/config.toml`
    /// 3. `~/.config/understory/config.toml`
    /// 4. `./understory.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./understory.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = UnderstoryConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }
}
