use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;

use crate::backend::{BackendClient, Endpoints};
use crate::bot::{self, AppState};
use crate::config::{AppConfig, ConfigStore};
use crate::registration::{RegistrationClient, RegistrationScheduler};

/// Everything the running service owns, built in [`App::init`] and torn
/// down in [`App::shutdown`].
pub struct App {
    store: Arc<ConfigStore>,
    state: Arc<AppState>,
    scheduler: RegistrationScheduler,
}

impl App {
    /// Load settings, register once and start the heartbeat.
    ///
    /// Fails unless the first registration succeeds; nothing is started then.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(ConfigStore::load(&config.config_file_path)?);
        tracing::info!("Settings loaded from {}", store.path().display());

        let registration = Arc::new(RegistrationClient::new(store.clone()));
        let outcome = registration.register().await;
        if !outcome.is_success() {
            anyhow::bail!(
                "initial registration failed ({}): {}",
                outcome.status,
                outcome.message
            );
        }

        // Handlers keep these endpoints until restart.
        let settings = store.settings();
        let api = BackendClient::new(Endpoints::from(&settings));
        let state = Arc::new(AppState {
            router: bot::MenuRouter::new(api),
        });

        let period = Duration::from_secs(settings.register_interval.max(1));
        let scheduler = RegistrationScheduler::start(registration, period);

        Ok(Self {
            store,
            state,
            scheduler,
        })
    }

    /// Serve Telegram updates until ctrl-c. In-flight handlers are drained
    /// before this returns.
    pub async fn run(&self) {
        let telegram = Bot::new(self.store.settings().token);

        Dispatcher::builder(telegram, bot::build_handler())
            .dependencies(dptree::deps![self.state.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    pub async fn shutdown(self) {
        self.scheduler.stop().await;

        let sessions = self.state.router.sessions();
        tracing::info!("Dropping {} sessions.", sessions.len());
        sessions.clear();
        tracing::info!("Shutdown complete.");
    }
}
