use std::error::Error;

use completion_service::telemetry;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let filter = telemetry::env_filter_with_level("warn", Level::INFO);

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer())
        .try_init()?;

    api::start().await?;

    Ok(())
}
