use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while loading or rewriting the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A required key is missing or carries a value of the wrong type.
    #[error("invalid settings in {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors from the REST collaborators.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry answered with status {0}")]
    Status(StatusCode),

    #[error("registry response is not a JSON object")]
    NotAnObject,

    #[error("merged settings are invalid: {0}")]
    Merge(serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
