//! Integration tests for layered configuration loading

use super::test_utils::with_config_env;
use change_registry::{ConfigLoader, DuplicateNamePolicy, Registry};
use change_registry::fingerprint::Hashable;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_defaults_without_any_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_config_env(&test_dir, &[], || ConfigLoader::load(&workspace)).unwrap();
    assert_eq!(config.registry.duplicate_names, DuplicateNamePolicy::Shadow);
    assert_eq!(config.poller.interval_ms, 1000);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_workspace_file_then_env_file_then_environment() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    let config_dir = workspace.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(
        config_dir.join("config.toml"),
        "[registry]\nduplicate_names = \"reject\"\n\n[poller]\ninterval_ms = 500\nthread_name = \"base\"\n",
    )
    .unwrap();
    fs::write(
        config_dir.join("staging.toml"),
        "[poller]\ninterval_ms = 200\n",
    )
    .unwrap();

    let config = with_config_env(
        &test_dir,
        &[
            ("CHANGE_REGISTRY_ENV", "staging"),
            ("CHANGE_REGISTRY__POLLER__THREAD_NAME", "from-env"),
        ],
        || ConfigLoader::load(&workspace),
    )
    .unwrap();

    assert_eq!(config.registry.duplicate_names, DuplicateNamePolicy::Reject);
    assert_eq!(config.poller.interval_ms, 200);
    assert_eq!(config.poller.thread_name, "from-env");
}

#[test]
fn test_invalid_environment_override_fails_validation() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let result = with_config_env(
        &test_dir,
        &[("CHANGE_REGISTRY__LOGGING__FORMAT", "yaml")],
        || ConfigLoader::load(&workspace),
    );
    assert!(result.is_err());
}

#[test]
fn test_registry_built_from_loaded_config() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("registry.toml");
    fs::write(&config_file, "[registry]\nduplicate_names = \"reject\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let registry: Registry<dyn Hashable> = Registry::with_config(&config);
    assert_eq!(registry.duplicate_policy(), DuplicateNamePolicy::Reject);
}
