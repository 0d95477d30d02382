//! Configuration sources layered on top of the defaults.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::{Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix; nested keys use `__`, e.g. `CHANGE_REGISTRY__POLLER__INTERVAL_MS`.
const ENV_PREFIX: &str = "CHANGE_REGISTRY";

/// Selects `config/{name}.toml` in the workspace (default: development).
const ENV_NAME_VAR: &str = "CHANGE_REGISTRY_ENV";

/// Path to the user-level config file, e.g. `$XDG_CONFIG_HOME/change-registry/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "change-registry")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_global_file(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Loading global configuration");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        _ => Ok(builder),
    }
}

/// Add workspace config files to the builder.
/// Precedence: config/config.toml (base) then config/{CHANGE_REGISTRY_ENV}.toml.
pub fn add_workspace_files(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_NAME_VAR).unwrap_or_else(|_| "development".to_string());

    for path in [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ] {
        if path.exists() {
            debug!(config_path = %path.display(), "Loading workspace configuration");
            builder = builder.add_source(File::from(path).required(false));
        }
    }

    Ok(builder)
}

/// Add `CHANGE_REGISTRY__*` environment overrides to the builder.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
