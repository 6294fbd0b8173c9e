//! Config file discovery, loading, and environment variable overlay.

use crate::sections::{AssetsConfig, ExportConfig, PlaybackConfig, ServiceConfig, SessionConfig};
use crate::{ConfigError, UnderstoryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/understory/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("understory/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    // Local override (current directory)
    let local = PathBuf::from("understory.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<UnderstoryConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from TOML string.
fn parse_toml(contents: &str, path: &Path) -> Result<UnderstoryConfig, ConfigError> {
    let mut config: UnderstoryConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    // Paths in config files may use ~ or $VAR prefixes.
    config.export.output_dir = expand_path(&config.export.output_dir.to_string_lossy());
    config.session.file = expand_path(&config.session.file.to_string_lossy());

    Ok(config)
}

/// Merge two configs, with `overlay` taking precedence.
///
/// A field wins when it differs from the compiled default, so a file that
/// only sets `[playback]` leaves the other sections alone.
pub fn merge_configs(base: UnderstoryConfig, overlay: UnderstoryConfig) -> UnderstoryConfig {
    UnderstoryConfig {
        service: ServiceConfig {
            generation_url: if overlay.service.generation_url
                != ServiceConfig::default().generation_url
            {
                overlay.service.generation_url
            } else {
                base.service.generation_url
            },
            timeout_secs: if overlay.service.timeout_secs != ServiceConfig::default().timeout_secs {
                overlay.service.timeout_secs
            } else {
                base.service.timeout_secs
            },
        },
        assets: AssetsConfig {
            store_url: if overlay.assets.store_url != AssetsConfig::default().store_url {
                overlay.assets.store_url
            } else {
                base.assets.store_url
            },
        },
        playback: PlaybackConfig {
            loop_period_secs: if overlay.playback.loop_period_secs
                != PlaybackConfig::default().loop_period_secs
            {
                overlay.playback.loop_period_secs
            } else {
                base.playback.loop_period_secs
            },
        },
        export: ExportConfig {
            item_delay_ms: if overlay.export.item_delay_ms != ExportConfig::default().item_delay_ms
            {
                overlay.export.item_delay_ms
            } else {
                base.export.item_delay_ms
            },
            output_dir: if overlay.export.output_dir != ExportConfig::default().output_dir {
                overlay.export.output_dir
            } else {
                base.export.output_dir
            },
        },
        session: SessionConfig {
            file: if overlay.session.file != SessionConfig::default().file {
                overlay.session.file
            } else {
                base.session.file
            },
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut UnderstoryConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("UNDERSTORY_GENERATION_URL") {
        config.service.generation_url = v;
        sources
            .env_overrides
            .push("UNDERSTORY_GENERATION_URL".to_string());
    }
    if let Ok(v) = env::var("UNDERSTORY_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse() {
            config.service.timeout_secs = secs;
            sources
                .env_overrides
                .push("UNDERSTORY_TIMEOUT_SECS".to_string());
        }
    }
    if let Ok(v) = env::var("UNDERSTORY_ASSET_STORE_URL") {
        config.assets.store_url = v;
        sources
            .env_overrides
            .push("UNDERSTORY_ASSET_STORE_URL".to_string());
    }
    if let Ok(v) = env::var("UNDERSTORY_LOOP_PERIOD_SECS") {
        if let Ok(secs) = v.parse() {
            config.playback.loop_period_secs = secs;
            sources
                .env_overrides
                .push("UNDERSTORY_LOOP_PERIOD_SECS".to_string());
        }
    }
    if let Ok(v) = env::var("UNDERSTORY_EXPORT_DELAY_MS") {
        if let Ok(ms) = v.parse() {
            config.export.item_delay_ms = ms;
            sources
                .env_overrides
                .push("UNDERSTORY_EXPORT_DELAY_MS".to_string());
        }
    }
    if let Ok(v) = env::var("UNDERSTORY_OUTPUT_DIR") {
        config.export.output_dir = expand_path(&v);
        sources
            .env_overrides
            .push("UNDERSTORY_OUTPUT_DIR".to_string());
    }
    if let Ok(v) = env::var("UNDERSTORY_SESSION_FILE") {
        config.session.file = expand_path(&v);
        sources
            .env_overrides
            .push("UNDERSTORY_SESSION_FILE".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/test/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[playback]
loop_period_secs = 4.0
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.playback.loop_period_secs, 4.0);
        // Other values should be defaults
        assert_eq!(config.service.generation_url, "http://127.0.0.1:8000");
        assert_eq!(config.export.item_delay_ms, 500);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[service]
generation_url = "https://generator.example"
timeout_secs = 30

[assets]
store_url = "https://store.example"

[playback]
loop_period_secs = 8.5

[export]
item_delay_ms = 250
output_dir = "/data/packs"

[session]
file = "/data/session.json"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.service.generation_url, "https://generator.example");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.assets.store_url, "https://store.example");
        assert_eq!(config.playback.loop_period_secs, 8.5);
        assert_eq!(config.export.item_delay_ms, 250);
        assert_eq!(config.export.output_dir, PathBuf::from("/data/packs"));
        assert_eq!(config.session.file, PathBuf::from("/data/session.json"));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = parse_toml("[service\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_merge_later_file_wins() {
        let base = parse_toml(
            r#"
[service]
generation_url = "https://first.example"

[export]
item_delay_ms = 100
"#,
            Path::new("base.toml"),
        )
        .unwrap();

        let overlay = parse_toml(
            r#"
[service]
generation_url = "https://second.example"
"#,
            Path::new("overlay.toml"),
        )
        .unwrap();

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.service.generation_url, "https://second.example");
        // Untouched by the overlay, kept from the base file
        assert_eq!(merged.export.item_delay_ms, 100);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("understory.toml");
        std::fs::write(&path, "[playback]\nloop_period_secs = 2.0\n").unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.playback.loop_period_secs, 2.0);
    }
}
