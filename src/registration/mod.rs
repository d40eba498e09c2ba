pub mod scheduler;

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::config::ConfigStore;
use crate::error::RegistrationError;

pub use scheduler::RegistrationScheduler;

pub const REGISTERED_MESSAGE: &str = "The new configurations saved successfully.";

/// Result of one heartbeat as a `(text, status)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub message: String,
    pub status: u16,
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Announces this service to the registry and stores whatever
/// configuration it hands back.
pub struct RegistrationClient {
    client: Client,
    store: Arc<ConfigStore>,
}

impl RegistrationClient {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            client: Client::new(),
            store,
        }
    }

    /// Run one heartbeat. Never fails: errors come back as a 500 outcome.
    pub async fn register(&self) -> RegistrationOutcome {
        match self.try_register().await {
            Ok(()) => {
                tracing::info!("Registration succeeded, settings saved to {}", self.store.path().display());
                RegistrationOutcome {
                    message: REGISTERED_MESSAGE.to_string(),
                    status: 200,
                }
            }
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                RegistrationOutcome {
                    message: format!("An error occurred: {}", e),
                    status: 500,
                }
            }
        }
    }

    async fn try_register(&self) -> Result<(), RegistrationError> {
        let current = self.store.settings();

        let resp = self
            .client
            .get(current.registration_url())
            .query(&[("deviceName", current.service_name.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RegistrationError::Status(resp.status()));
        }

        let body = match resp.json::<Value>().await? {
            Value::Object(map) => map,
            _ => return Err(RegistrationError::NotAnObject),
        };

        let merged = current.merged_with(&body).map_err(RegistrationError::Merge)?;
        self.store.apply(merged)?;
        Ok(())
    }
}
