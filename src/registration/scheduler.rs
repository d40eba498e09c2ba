use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::RegistrationClient;

/// Fires the registration heartbeat on a fixed interval until stopped.
///
/// A failed heartbeat is logged and the next tick still fires.
pub struct RegistrationScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RegistrationScheduler {
    /// Start ticking. The first heartbeat fires one `period` from now, since
    /// startup already registered once.
    pub fn start(client: Arc<RegistrationClient>, period: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcome = client.register().await;
                        tracing::debug!("Scheduled registration: {} ({})", outcome.message, outcome.status);
                    }
                    _ = stop.changed() => break,
                }
            }

            tracing::info!("Registration scheduler stopped.");
        });

        tracing::info!("Registration scheduler started, every {:?}.", period);
        Self { shutdown, handle }
    }

    /// Signal the loop and wait for an in-flight heartbeat to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!("Registration scheduler task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::tests::store_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn keeps_ticking_after_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (_dir, store) = store_for(&server);
        let client = Arc::new(RegistrationClient::new(store));
        let scheduler = RegistrationScheduler::start(client, Duration::from_millis(40));

        tokio::time::sleep(Duration::from_millis(300)).await;
        scheduler.stop().await;

        let hits = server.received_requests().await.unwrap().len();
        assert!(hits >= 2, "expected repeated heartbeats, got {}", hits);
    }

    #[tokio::test]
    async fn does_not_fire_before_first_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let (_dir, store) = store_for(&server);
        let client = Arc::new(RegistrationClient::new(store));
        let scheduler = RegistrationScheduler::start(client, Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop().await;

        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
