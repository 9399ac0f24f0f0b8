//! Server components for octocord.

pub mod config;
pub mod discord;
pub mod server;
pub mod webhook;

pub use config::{Config, ConfigError, LogFormat};
pub use discord::{DiscordClient, DiscordError};
pub use server::{ServerHandle, WebhookServer};
pub use webhook::{router, AppState};
