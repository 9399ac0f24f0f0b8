//! octocord CLI
//!
//! Sign, send and preview GitHub webhook payloads against an octocord server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use octocord_core::request::{HEADER_EVENT, HEADER_SIGNATURE};
use octocord_core::{compute_signature, format_signature_header, route};

#[derive(Parser)]
#[command(name = "octocord-cli")]
#[command(about = "Test tooling for the octocord webhook relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the X-Hub-Signature-256 header value for a payload
    Sign {
        /// Webhook secret
        #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,

        /// Payload file
        file: PathBuf,
    },

    /// Send a signed payload to a running server
    Send {
        /// Webhook endpoint
        #[arg(long, default_value = "http://127.0.0.1:8082/github-webhook")]
        url: String,

        /// Webhook secret
        #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,

        /// GitHub event type (e.g. pull_request, workflow_run)
        #[arg(long, short)]
        event: String,

        /// Payload file
        file: PathBuf,
    },

    /// Render a payload locally and print the notification it produces
    Render {
        /// GitHub event type
        #[arg(long, short)]
        event: String,

        /// Payload file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Sign { secret, file } => {
            let body = read_payload(&file)?;
            println!("{}", signature_header(&body, &secret));
        }

        Commands::Send {
            url,
            secret,
            event,
            file,
        } => {
            let body = read_payload(&file)?;
            let (status, text) = send(&url, &secret, &event, body).await?;
            println!("{status} {text}");
        }

        Commands::Render { event, file } => {
            let body = read_payload(&file)?;
            let payload: serde_json::Value =
                serde_json::from_slice(&body).context("Payload is not valid JSON")?;

            match route(&event, &payload) {
                Some(message) => println!("{}", serde_json::to_string_pretty(&message)?),
                None => println!("No notification for event '{event}'"),
            }
        }
    }

    Ok(())
}

fn read_payload(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn signature_header(body: &[u8], secret: &str) -> String {
    format_signature_header(&compute_signature(body, secret.as_bytes()))
}

/// Post a signed payload; returns the response status and body.
async fn send(
    url: &str,
    secret: &str,
    event: &str,
    body: Vec<u8>,
) -> Result<(reqwest::StatusCode, String)> {
    let signature = signature_header(&body, secret);
    debug!(url, event, "Sending webhook");

    let response = reqwest::Client::new()
        .post(url)
        .header("Content-Type", "application/json")
        .header(HEADER_EVENT, event)
        .header(HEADER_SIGNATURE, signature)
        .body(body)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Ok((status, text))
}
