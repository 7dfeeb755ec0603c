//! Network file resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → none.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A discovered network file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPath {
    pub path: PathBuf,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a network definition was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Explicitly provided via `--network`.
    CliArgument,

    /// Set via `BAYESNET_NETWORK` or `BAYESNET_CONFIG_DIR`.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// A built-in preset selected with `--preset`.
    #[default]
    Preset,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::Preset => write!(f, "builtin preset"),
        }
    }
}

/// Environment variable names.
pub const ENV_NETWORK_PATH: &str = "BAYESNET_NETWORK";
pub const ENV_CONFIG_DIR: &str = "BAYESNET_CONFIG_DIR";

/// Standard network file name inside a config directory.
pub const NETWORK_FILENAME: &str = "network.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bayesnet";

/// Resolve the network file using the standard resolution order.
///
/// 1. Explicit CLI path (returned even if missing, so the loader reports it)
/// 2. `BAYESNET_NETWORK`
/// 3. `BAYESNET_CONFIG_DIR` + `network.json`
/// 4. XDG config directory (`~/.config/bayesnet/network.json`)
/// 5. None
pub fn resolve_network(cli_path: Option<&Path>) -> Option<NetworkPath> {
    if let Some(path) = cli_path {
        return Some(NetworkPath {
            path: path.to_path_buf(),
            source: ConfigSource::CliArgument,
        });
    }

    if let Ok(env_path) = std::env::var(ENV_NETWORK_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Some(NetworkPath {
                path,
                source: ConfigSource::Environment,
            });
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(NETWORK_FILENAME);
        if path.exists() {
            return Some(NetworkPath {
                path,
                source: ConfigSource::Environment,
            });
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(NETWORK_FILENAME);
        if path.exists() {
            return Some(NetworkPath {
                path,
                source: ConfigSource::XdgConfig,
            });
        }
    }

    None
}

/// XDG config directory for bayesnet.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
