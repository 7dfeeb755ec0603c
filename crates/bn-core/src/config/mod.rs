//! Network loading for bn-core.
//!
//! Finds a network (preset, CLI path, environment, XDG), parses it by file
//! extension, validates it, and builds the in-memory [`Network`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bn_config::{
    get_preset, resolve_network, validate_network_spec, ConfigSource, NetworkSnapshot,
    NetworkSpec, PresetError, PresetName, TableSpec, ValidationError,
};
use bn_math::FILE_PROBABILITY_TOLERANCE;
use thiserror::Error;

use crate::network::{Cpt, Network, NetworkError};

/// Errors during network loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("network file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("unsupported network file extension: {path} (expected .json, .toml, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid network {origin}: {source}")]
    Invalid {
        origin: String,
        #[source]
        source: ValidationError,
    },

    #[error("network {origin} cannot be built: {source}")]
    Network {
        origin: String,
        #[source]
        source: NetworkError,
    },

    #[error(transparent)]
    UnknownPreset(#[from] PresetError),

    #[error("no network given")]
    NoNetwork,

    #[error("IO error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for bn_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => bn_common::Error::InvalidNetworkFile {
                path: path.display().to_string(),
                message: "file not found".to_string(),
            },
            ConfigError::ParseError { path, message } => bn_common::Error::InvalidNetworkFile {
                path: path.display().to_string(),
                message,
            },
            ConfigError::UnsupportedFormat { path } => bn_common::Error::InvalidNetworkFile {
                path: path.display().to_string(),
                message: "unsupported file extension".to_string(),
            },
            ConfigError::Invalid { origin, source } => bn_common::Error::InvalidNetworkFile {
                path: origin,
                message: source.to_string(),
            },
            ConfigError::Network { source, .. } => source.into(),
            ConfigError::UnknownPreset(PresetError::UnknownPreset(name)) => {
                bn_common::Error::UnknownPreset(name)
            }
            ConfigError::NoNetwork => bn_common::Error::NoNetwork,
            ConfigError::IoError { source, .. } => bn_common::Error::Io(source),
        }
    }
}

/// On-disk encodings of a network file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Yaml,
}

impl FileFormat {
    /// Pick the encoding from the file extension.
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            _ => None,
        }
    }

    /// Parse network file content in this encoding.
    pub fn parse(self, content: &str) -> Result<NetworkSpec, String> {
        match self {
            FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            FileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Where to look for the network.
#[derive(Debug, Clone, Default)]
pub struct NetworkOptions {
    /// Explicit network file path (overrides env and XDG).
    pub network_path: Option<PathBuf>,

    /// Built-in preset name (overrides every path source).
    pub preset: Option<String>,
}

/// A loaded, validated network with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
    pub spec: NetworkSpec,
    pub network: Network,
    pub snapshot: NetworkSnapshot,
}

impl ResolvedNetwork {
    /// Network name from the file or preset.
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Read and parse a network file without validating it.
pub fn load_network_spec(path: &Path) -> Result<NetworkSpec, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = FileFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    format
        .parse(&content)
        .map_err(|message| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        })
}

impl Network {
    /// Build a network from its file form.
    ///
    /// Only construction errors are reported here; call
    /// [`Network::validate`] for table completeness.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Network, NetworkError> {
        let mut network = Network::new();
        for node in &spec.nodes {
            network.add_node(
                node.name.as_str(),
                node.domain.iter().map(String::as_str),
                node.parents.iter().map(String::as_str),
            )?;
            let cpt = match &node.table {
                TableSpec::Marginal(dist) => Cpt::Unconditional(dist.clone()),
                TableSpec::Conditional(rows) => Cpt::Conditional(
                    rows.iter()
                        .map(|row| (row.given.clone(), row.probabilities.clone()))
                        .collect(),
                ),
            };
            network.set_cpt(&node.name, cpt)?;
        }
        Ok(network)
    }
}

/// Validate a parsed network file and build its network.
///
/// `origin` names the network in error messages (a path or `preset:<name>`).
pub fn build_network(spec: &NetworkSpec, origin: &str) -> Result<Network, ConfigError> {
    validate_network_spec(spec).map_err(|source| ConfigError::Invalid {
        origin: origin.to_string(),
        source,
    })?;
    let network_err = |source| ConfigError::Network {
        origin: origin.to_string(),
        source,
    };
    let network = Network::from_spec(spec).map_err(network_err)?;
    network
        .validate_with_tolerance(FILE_PROBABILITY_TOLERANCE)
        .map_err(network_err)?;
    Ok(network)
}

/// Load the network selected by `options`.
///
/// A preset wins over every path source. Otherwise the path comes from
/// [`resolve_network`]: CLI argument, then environment, then XDG.
pub fn load_network(options: &NetworkOptions) -> Result<ResolvedNetwork, ConfigError> {
    if let Some(name) = &options.preset {
        let preset = PresetName::from_str(name)?;
        let spec = get_preset(preset);
        let network = build_network(&spec, &format!("preset:{}", preset))?;
        let snapshot = NetworkSnapshot::new(&spec, ConfigSource::Preset, None);
        return Ok(ResolvedNetwork {
            spec,
            network,
            snapshot,
        });
    }

    let resolved =
        resolve_network(options.network_path.as_deref()).ok_or(ConfigError::NoNetwork)?;
    let spec = load_network_spec(&resolved.path)?;
    let origin = resolved.path.display().to_string();
    let network = build_network(&spec, &origin)?;
    let snapshot = NetworkSnapshot::new(&spec, resolved.source, Some(origin.as_str()));

    Ok(ResolvedNetwork {
        spec,
        network,
        snapshot,
    })
}
