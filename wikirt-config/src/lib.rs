//! Shared configuration loader for the wikirt toolchain.
//!
//! `defaults/wikirt.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`WikirtConfig`].
//!
//! The `wikirt` binary layers, lowest first:
//!
//! 1. the embedded defaults
//! 2. [`LOCAL_CONFIG_FILE`] in the working directory, when present
//! 3. the file named by `--config`, which must exist
//! 4. command-line flags, set with [`Loader::set_override`]: `--format` as
//!    `report.format`, `--prefix`, `--domain`, `--parsoid-url` and `--api-url`
//!    as the matching `service.*` keys, `--parallel` as `classify.parallel`
//!
//! Keys are the section and field names of [`WikirtConfig`], e.g.
//! `service.max_attempts` or `logging.filter`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use wikirt::ServiceSettings;

pub use config::ConfigError as LoadError;

const DEFAULT_TOML: &str = include_str!("../defaults/wikirt.default.toml");

/// Configuration picked up from the working directory without a flag.
pub const LOCAL_CONFIG_FILE: &str = "wikirt.toml";

/// Top-level configuration consumed by wikirt applications.
#[derive(Debug, Clone, Deserialize)]
pub struct WikirtConfig {
    pub service: ServiceConfig,
    pub classify: ClassifyConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Endpoints and retry policy of the parse/serialize service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub parsoid_url: String,
    pub api_url: String,
    pub domain: String,
    pub prefix: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl From<&ServiceConfig> for ServiceSettings {
    fn from(config: &ServiceConfig) -> Self {
        ServiceSettings {
            parsoid_url: config.parsoid_url.clone(),
            api_url: config.api_url.clone(),
            domain: config.domain.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyConfig {
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<WikirtConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<WikirtConfig, ConfigError> {
    Loader::new().build()
}
