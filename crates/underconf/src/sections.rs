//! Configuration sections, one struct per TOML table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The generation service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the generation service (`/api/process` lives here).
    /// Default: http://127.0.0.1:8000
    #[serde(default = "ServiceConfig::default_generation_url")]
    pub generation_url: String,

    /// Request timeout in seconds. Generation can take a while; the default
    /// is generous.
    #[serde(default = "ServiceConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServiceConfig {
    fn default_generation_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    fn default_timeout_secs() -> u64 {
        120
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            generation_url: Self::default_generation_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// The asset store that hosts uploaded videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Base URL of the asset store upload endpoint.
    /// Default: http://127.0.0.1:8787
    #[serde(default = "AssetsConfig::default_store_url")]
    pub store_url: String,
}

impl AssetsConfig {
    fn default_store_url() -> String {
        "http://127.0.0.1:8787".to_string()
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            store_url: Self::default_store_url(),
        }
    }
}

/// Timeline playback behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds between LOOP retriggers.
    /// Default: 10.0
    #[serde(default = "PlaybackConfig::default_loop_period_secs")]
    pub loop_period_secs: f64,
}

impl PlaybackConfig {
    fn default_loop_period_secs() -> f64 {
        10.0
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            loop_period_secs: Self::default_loop_period_secs(),
        }
    }
}

/// Pack export behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Milliseconds to wait between successive downloads.
    /// Default: 500
    #[serde(default = "ExportConfig::default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Directory exported packs land in.
    /// Default: ./pack
    #[serde(default = "ExportConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl ExportConfig {
    fn default_item_delay_ms() -> u64 {
        500
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("pack")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            item_delay_ms: Self::default_item_delay_ms(),
            output_dir: Self::default_output_dir(),
        }
    }
}

/// Where the session manifest lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the session file that carries state between commands.
    /// Default: ./understory-session.json
    #[serde(default = "SessionConfig::default_file")]
    pub file: PathBuf,
}

impl SessionConfig {
    fn default_file() -> PathBuf {
        PathBuf::from("understory-session.json")
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
        }
    }
}
