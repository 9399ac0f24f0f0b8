//! Discord REST client: channel lookup and embed delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use octocord_core::{
    ChannelError, ChannelInfo, ChannelKind, ChatSession, Color, DeliveryError, DeliverySink,
    NotificationMessage, TargetChannel,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const READY_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Discord channel types a bot can post embeds to.
const GUILD_TEXT: u8 = 0;
const GUILD_ANNOUNCEMENT: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("bot token is not a valid header value: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<EmbedAuthor<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<EmbedFooter<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

/// Embed color for a message tag.
pub fn embed_color(color: Color) -> u32 {
    match color {
        Color::Info => 0x3498DB,
        Color::Merged => 0x9B59B6,
        Color::Success => 0x2ECC71,
        Color::Failure => 0xE74C3C,
        Color::Neutral => 0xE67E22,
    }
}

impl<'a> From<&'a NotificationMessage> for Embed<'a> {
    fn from(msg: &'a NotificationMessage) -> Self {
        Self {
            title: &msg.title,
            url: msg.url.as_deref(),
            description: msg.description.as_deref(),
            color: embed_color(msg.color),
            author: msg.author.as_ref().map(|a| EmbedAuthor {
                name: &a.name,
                url: a.url.as_deref(),
                icon_url: a.icon_url.as_deref(),
            }),
            fields: msg
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: &f.name,
                    value: &f.value,
                    inline: f.inline,
                })
                .collect(),
            footer: msg.footer.as_deref().map(|text| EmbedFooter { text }),
        }
    }
}

/// Bot-authenticated Discord REST client.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    ready_retry_delay: Duration,
}

impl DiscordClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self, DiscordError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(
                "DiscordBot (https://github.com/octocord/octocord, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            ready_retry_delay: READY_RETRY_DELAY,
        })
    }

    /// Override the delay between readiness probes.
    pub fn with_ready_retry_delay(mut self, delay: Duration) -> Self {
        self.ready_retry_delay = delay;
        self
    }

    async fn current_user(&self) -> Result<CurrentUser, reqwest::Error> {
        self.http
            .get(format!("{}/users/@me", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// A rejected token will not fix itself, so readiness stops retrying.
fn is_rejected_token(e: &reqwest::Error) -> bool {
    matches!(
        e.status(),
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    )
}

#[async_trait]
impl ChatSession for DiscordClient {
    async fn wait_until_ready(&self) -> Result<(), ChannelError> {
        loop {
            match self.current_user().await {
                Ok(user) => {
                    info!(user = %user.username, id = %user.id, "Connected to Discord");
                    return Ok(());
                }
                Err(e) if is_rejected_token(&e) => {
                    error!(error = %e, "Discord rejected the bot token");
                    return Err(ChannelError::Unauthorized(e.to_string()));
                }
                Err(e) => {
                    warn!(error = %e, "Discord not reachable yet, retrying");
                    tokio::time::sleep(self.ready_retry_delay).await;
                }
            }
        }
    }

    async fn lookup_channel(&self, id: u64) -> Result<Option<ChannelInfo>, ChannelError> {
        let resp = self
            .http
            .get(format!("{}/channels/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| ChannelError::Session(e.to_string()))?;

        // Channels the bot cannot see are as good as missing
        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::FORBIDDEN) {
            debug!(channel_id = id, status = %resp.status(), "Channel lookup returned nothing");
            return Ok(None);
        }

        let channel: Channel = resp
            .error_for_status()
            .map_err(|e| ChannelError::Session(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChannelError::Session(e.to_string()))?;

        let id = channel
            .id
            .parse()
            .map_err(|_| ChannelError::Session(format!("invalid channel id {:?}", channel.id)))?;
        let kind = match channel.kind {
            GUILD_TEXT | GUILD_ANNOUNCEMENT => ChannelKind::Text,
            other => ChannelKind::Other(other),
        };

        Ok(Some(ChannelInfo {
            id,
            name: channel.name.unwrap_or_default(),
            kind,
        }))
    }
}

#[async_trait]
impl DeliverySink for DiscordClient {
    async fn send(
        &self,
        channel: &TargetChannel,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        let body = CreateMessage {
            embeds: [Embed::from(message)],
        };
        let resp = self
            .http
            .post(format!("{}/channels/{}/messages", self.base_url, channel.id()))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::FORBIDDEN {
            return Err(DeliveryError::PermissionDenied);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(DeliveryError::Transport(format!("HTTP {status}: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use octocord_core::request::{HEADER_EVENT, HEADER_SIGNATURE};
    use octocord_core::{
        compute_signature, format_signature_header, Author, ChannelResolver, Dispatcher, Outcome,
        WebhookRequest,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> DiscordClient {
        DiscordClient::new("tok", &server.uri())
            .unwrap()
            .with_ready_retry_delay(Duration::from_millis(10))
    }

    fn target(id: u64) -> TargetChannel {
        TargetChannel::new(id, "github")
    }

    #[test]
    fn test_embed_shape() {
        let msg = NotificationMessage::new("New Pull Request: Fix bug", Color::Info)
            .with_url("https://github.com/o/r/pull/1")
            .with_author(Author {
                name: "alice".into(),
                icon_url: Some("https://avatars/alice".into()),
                url: Some("https://github.com/alice".into()),
            })
            .with_field("Branch", "`fix/123`", true)
            .with_footer("PR #1");

        let value = serde_json::to_value(Embed::from(&msg)).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "New Pull Request: Fix bug",
                "url": "https://github.com/o/r/pull/1",
                "color": 0x3498DB,
                "author": {
                    "name": "alice",
                    "url": "https://github.com/alice",
                    "icon_url": "https://avatars/alice"
                },
                "fields": [{ "name": "Branch", "value": "`fix/123`", "inline": true }],
                "footer": { "text": "PR #1" }
            })
        );
    }

    #[test]
    fn test_minimal_embed_omits_empty_parts() {
        let msg = NotificationMessage::new("t", Color::Neutral);
        let value = serde_json::to_value(Embed::from(&msg)).unwrap();
        assert_eq!(value, json!({ "title": "t", "color": 0xE67E22 }));
    }

    #[tokio::test]
    async fn test_lookup_text_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .and(header("authorization", "Bot tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "name": "github",
                "type": 0
            })))
            .mount(&server)
            .await;

        let info = client(&server).await.lookup_channel(42).await.unwrap().unwrap();
        assert_eq!(info.id, 42);
        assert_eq!(info.name, "github");
        assert_eq!(info.kind, ChannelKind::Text);
    }

    #[tokio::test]
    async fn test_lookup_voice_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "name": "Lounge",
                "type": 2
            })))
            .mount(&server)
            .await;

        let info = client(&server).await.lookup_channel(42).await.unwrap().unwrap();
        assert_eq!(info.kind, ChannelKind::Other(2));
    }

    #[tokio::test]
    async fn test_lookup_missing_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client(&server).await.lookup_channel(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).await.lookup_channel(42).await,
            Err(ChannelError::Session(_))
        ));
    }

    #[tokio::test]
    async fn test_wait_until_ready_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1",
                "username": "octocord"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).await.wait_until_ready().await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_until_ready_stops_on_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "401: Unauthorized",
                "code": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            client(&server).await.wait_until_ready(),
        )
        .await
        .expect("readiness wait should not retry a rejected token");
        assert!(matches!(result, Err(ChannelError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_rejected_token_does_not_stall_dispatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "name": "github",
                "type": 0
            })))
            .expect(0)
            .mount(&server)
            .await;

        let discord = client(&server).await;
        let resolver = Arc::new(ChannelResolver::new(discord.clone(), 42));
        let dispatcher = Dispatcher::new(&b"s3cret"[..], resolver, discord);

        let body = serde_json::to_vec(&json!({
            "action": "completed",
            "workflow": { "name": "CI" },
            "workflow_run": {
                "id": 9,
                "conclusion": "failure",
                "head_branch": "main",
                "html_url": "https://x/run/9",
                "actor": { "login": "carol" }
            }
        }))
        .unwrap();
        let request = WebhookRequest::new(body.clone())
            .with_header(
                HEADER_SIGNATURE,
                format_signature_header(&compute_signature(&body, b"s3cret")),
            )
            .with_header(HEADER_EVENT, "workflow_run");

        let outcome = tokio::time::timeout(Duration::from_secs(2), dispatcher.handle(&request))
            .await
            .expect("dispatch should answer with a rejected token")
            .unwrap();
        assert_eq!(outcome, Outcome::ChannelUnavailable);
    }

    #[tokio::test]
    async fn test_send_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(body_partial_json(json!({
                "embeds": [{ "title": "Workflow Run Failed: CI", "color": 0xE74C3C }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
            .expect(1)
            .mount(&server)
            .await;

        let msg = NotificationMessage::new("Workflow Run Failed: CI", Color::Failure);
        client(&server).await.send(&target(42), &msg).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_forbidden_is_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let msg = NotificationMessage::new("t", Color::Info);
        assert!(matches!(
            client(&server).await.send(&target(42), &msg).await,
            Err(DeliveryError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_send_other_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let msg = NotificationMessage::new("t", Color::Info);
        match client(&server).await.send(&target(42), &msg).await {
            Err(DeliveryError::Transport(text)) => assert!(text.contains("boom")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
