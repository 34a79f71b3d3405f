//! Configuration management
//!
//! Settings live in `<config dir>/gaussparse/config.toml`. Every section is
//! optional; missing keys take their defaults. Command-line flags override
//! whatever the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::files::naming::DEFAULT_SUFFIX;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Where batch runs look for logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub pattern: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out_molecules"),
            pattern: "*.log".to_string(),
        }
    }
}

/// Where records are written. `directory` is relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub aggregate_file: String,
    pub separate_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out_molecules_json"),
            aggregate_file: "out_molecules.json".to_string(),
            separate_suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Diagnostic log files, appended to on every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub info_log: PathBuf,
    pub error_log: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            info_log: PathBuf::from("parsing_info.log"),
            error_log: PathBuf::from("parsing_errors.log"),
        }
    }
}

/// Completion webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Environment variable holding the webhook URL
    pub env_var: String,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            env_var: "DISCORD_URL".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Worker count; unset uses the available parallelism
    pub jobs: Option<usize>,
}

impl Config {
    /// Path of the default configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("gaussparse").join("config.toml"))
    }

    /// Load from `explicit` (which must exist) or from the default location
    /// (which may be absent).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Ok(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
