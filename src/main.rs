use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod bot;
mod composer;
mod config;
mod error;
mod holidays;
mod responder;
mod responder_manager;
mod responders;
mod telegram;
mod toasts;

use config::{Args, BotConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "povod_bot=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables from .env file before clap reads them
    dotenvy::dotenv().ok();

    let config = BotConfig::from_args(Args::parse())?;

    info!(
        source = ?config.source,
        data_dir = %config.data_dir.display(),
        "Starting holiday bot"
    );

    bot::run(config).await
}
