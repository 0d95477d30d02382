//! Error types for the change-tracking registry.

use thiserror::Error;

/// Failure reported by an entity whose fingerprint computation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HashError {
    pub message: String,
}

impl HashError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Registry-related errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Hash computation failed for '{name}': {source}")]
    HashComputation {
        name: String,
        #[source]
        source: HashError,
    },

    #[error("Entity already registered under name: {0}")]
    DuplicateName(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RegistryError {
    fn from(err: config::ConfigError) -> Self {
        RegistryError::Config(err.to_string())
    }
}
