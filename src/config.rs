//! Configuration System
//!
//! Layered configuration for the registry, its poller and logging. Sources are merged
//! with the `config` crate in increasing precedence: built-in defaults, the user-level
//! config file, the workspace `config/` directory, then `CHANGE_REGISTRY__*` environment
//! variables.

use crate::error::RegistryError;
use crate::logging::LoggingConfig;
use crate::poller::PollerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;
mod sources;

pub use sources::global_config_path;

/// What `try_register` does with a name that is already registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// Keep both entries for scanning; lookups resolve to the newest.
    #[default]
    Shadow,
    /// Refuse the registration with `RegistryError::DuplicateName`.
    Reject,
}

/// Registry behavior settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub duplicate_names: DuplicateNamePolicy,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub registry: RegistrySettings,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Poller(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Poller(msg) => write!(f, "Poller: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RegistryConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.poller.validate() {
            errors.push(ValidationError::Poller(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`RegistryConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace files and environment overrides
    pub fn load(workspace_root: &Path) -> Result<RegistryConfig, RegistryError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = sources::add_global_file(builder)?;
        let builder = sources::add_workspace_files(builder, workspace_root)?;
        let builder = sources::add_environment(builder);
        Self::finish(builder)
    }

    /// Load a single TOML file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<RegistryConfig, RegistryError> {
        let builder = defaults::builder_with_defaults()?
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(true));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<RegistryConfig, RegistryError> {
        let config: RegistryConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            RegistryError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}

impl RegistryConfig {
    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String, RegistryError> {
        toml::to_string_pretty(self).map_err(|e| RegistryError::Config(e.to_string()))
    }
}
