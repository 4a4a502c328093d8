//! Layered configuration.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory (e.g. `~/.config/dupsweep/config.toml` on Linux)
//! 3. Environment variables prefixed `DUPSWEEP_` (e.g. `DUPSWEEP_THREADS=8`)
//! 4. CLI flags, applied by the caller
//!
//! ```toml
//! threads = 8
//! paranoid = true
//! extra_skip_dirs = ["Backups", "vendor"]
//! progress_interval = 500
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{FinderConfig, DEFAULT_PROGRESS_INTERVAL};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Errors raised while loading or rendering configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a value of the wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing threads; 0 means one per CPU.
    pub threads: usize,
    /// Verify full-hash matches byte for byte.
    pub paranoid: bool,
    /// Directory names skipped in addition to the built-in denylist.
    pub extra_skip_dirs: Vec<String>,
    /// Files enumerated between two progress reports.
    pub progress_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            paranoid: false,
            extra_skip_dirs: Vec::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Config {
    /// Load defaults, the config file, then `DUPSWEEP_*` variables.
    ///
    /// Without `explicit_path` the platform default file is used if it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit_path` does not exist,
    /// or [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit_path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        let figment = Self::figment(file.as_deref()).merge(Env::prefixed(ENV_PREFIX));
        Self::extract(&figment)
    }

    /// Defaults merged with an optional TOML file, without environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                figment.merge(Toml::file(path))
            }
            None => figment,
        }
    }

    /// Extract a config from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value cannot be deserialized.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Platform-specific default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_threads(self.threads)
            .with_paranoid(self.paranoid)
            .with_extra_skip_dirs(self.extra_skip_dirs.clone())
            .with_progress_interval(self.progress_interval)
    }
}
