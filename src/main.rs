use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod bot;
mod config;
mod error;
mod registration;

use app::App;
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting place admin bot...");

    let config = AppConfig::from_env()?;

    let app = App::init(&config).await?;
    tracing::info!("Registered. Starting Telegram dispatcher.");

    app.run().await;
    app.shutdown().await;

    Ok(())
}
