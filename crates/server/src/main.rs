//! octocord
//!
//! Relays GitHub webhook events to a Discord channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use octocord_core::{ChannelResolver, ChatSession, Dispatcher};
use octocord_server::{router, Config, DiscordClient, LogFormat, WebhookServer};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_logging(config.log_format)?;

    config.validate().context("Invalid configuration")?;

    info!(channel_id = config.channel_id, "octocord starting");

    let discord = DiscordClient::new(&config.discord_token, &config.discord_api_url)
        .context("Failed to build Discord client")?;

    discord
        .wait_until_ready()
        .await
        .context("Discord login failed, check DISCORD_TOKEN")?;

    let resolver = Arc::new(ChannelResolver::new(discord.clone(), config.channel_id));

    // Look the channel up as soon as the session is ready so a bad
    // TARGET_CHANNEL_ID shows up in the logs before the first webhook.
    tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move {
            resolver.resolve().await;
        }
    });

    let dispatcher = Arc::new(Dispatcher::new(
        config.webhook_secret.as_bytes(),
        resolver,
        discord,
    ));

    let handle = WebhookServer::start(config.listen_addr, router(dispatcher))
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown requested");
    handle.shutdown().await.context("Server error")?;

    Ok(())
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}
