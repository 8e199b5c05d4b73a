//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Console transport configuration
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Names the roster starts with
    #[serde(default)]
    pub roster: RosterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Handle the bot answers as
    #[serde(default = "default_handle")]
    pub handle: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Separates the sender from the command text (`alice: help`)
    #[serde(default = "default_sender_separator")]
    pub sender_separator: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub players: Vec<String>,

    #[serde(default)]
    pub teams: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            handle: default_handle(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            sender_separator: default_sender_separator(),
        }
    }
}

fn default_handle() -> String {
    "TourneyBot".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_sender_separator() -> String {
    ":".into()
}

/// `TOURNEY_BOT__LOG_LEVEL=debug`, `TOURNEY_ROSTER__PLAYERS=alice,bob`, ...
fn environment() -> Environment {
    Environment::with_prefix("TOURNEY")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("roster.players")
        .with_list_parse_key("roster.teams")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_builder(config::Config::builder().add_source(environment()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
