use std::error::Error;

use ai_llm_service::telemetry;
use api::AppConfig;
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; real deployments set the environment directly.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, ".env present but unreadable; continuing with process environment");
        }
    }

    let config = AppConfig::from_env()?;
    info!(
        address = %config.server.address,
        embedding = config.embedding.provider.label(),
        chat = config.chat.as_ref().map(|c| c.provider.label()).unwrap_or("none"),
        admin_reindex = config.server.admin_secret.is_some(),
        "starting mini chat backend"
    );

    api::start(config).await?;

    Ok(())
}
