//! Tournament bot - Main entry point.

use anyhow::Context;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tourney_bot::commands::{self, Tourney};
use tourney_bot::config::Config;
use tourney_bot::console;
use tourney_bot::error::AppResult;
use tourney_bot::roster::Roster;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting {}...", config.bot.handle);

    let roster = Arc::new(Roster::from_config(&config.roster));
    let tourney = Arc::new(Tourney::new(roster));
    let dispatcher = commands::dispatcher(&tourney)?;

    info!(
        separator = %config.console.sender_separator,
        "Listening for tells on stdin..."
    );

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    tokio::select! {
        result = console::run(&dispatcher, &config.console.sender_separator, input, output) => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Replies go to stdout, so logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
