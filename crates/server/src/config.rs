//! Server configuration from flags and environment.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "octocord")]
#[command(about = "Relay GitHub webhooks to a Discord channel")]
pub struct Config {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Shared secret configured on the GitHub webhook
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    /// Discord channel receiving notifications
    #[arg(long, env = "TARGET_CHANNEL_ID")]
    pub channel_id: u64,

    /// Address the webhook listener binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8082")]
    pub listen_addr: SocketAddr,

    /// Discord REST API base URL
    #[arg(long, env = "DISCORD_API_URL", default_value = DEFAULT_DISCORD_API_URL)]
    pub discord_api_url: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN is empty")]
    MissingToken,

    #[error("GITHUB_WEBHOOK_SECRET is empty")]
    MissingSecret,

    #[error("TARGET_CHANNEL_ID must be a non-zero channel id")]
    MissingChannel,
}

impl Config {
    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discord_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.webhook_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.channel_id == 0 {
            return Err(ConfigError::MissingChannel);
        }
        Ok(())
    }
}
