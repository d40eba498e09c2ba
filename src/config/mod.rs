pub mod settings;
pub mod store;

use std::path::PathBuf;

pub use settings::Settings;
pub use store::ConfigStore;

const DEFAULT_CONFIG_FILE_PATH: &str = "config/service.conf";

/// Process-level bootstrap read from the environment. Everything else lives
/// in the config file so the registry can rewrite it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the `key = value` settings file
    pub config_file_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            config_file_path: std::env::var("CONFIG_FILE_PATH")
                .unwrap_or_else(|_| DEFAULT_CONFIG_FILE_PATH.to_string())
                .into(),
        })
    }
}
