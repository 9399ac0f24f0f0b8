//! Lazy resolution of the notification channel.

use std::sync::OnceLock;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// What kind of channel an id points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Accepts text messages.
    Text,
    /// Voice, category, forum, DM... anything we cannot post to.
    Other(u8),
}

/// A channel as reported by the chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

/// Resolved delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChannel {
    id: u64,
    name: String,
}

impl TargetChannel {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel {0} not found")]
    NotFound(u64),

    #[error("channel {id} is not a text channel ({kind:?})")]
    WrongType { id: u64, kind: ChannelKind },

    #[error("chat session error: {0}")]
    Session(String),

    #[error("chat session rejected its credentials: {0}")]
    Unauthorized(String),
}

/// Chat-platform session the resolver looks channels up in.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Suspend until the session is connected and can answer lookups.
    ///
    /// Transient failures are retried inside the session. An error means the
    /// session can never become ready, e.g. the platform rejected the token.
    async fn wait_until_ready(&self) -> Result<(), ChannelError>;

    /// Look a channel up by id. `Ok(None)` when it does not exist.
    async fn lookup_channel(&self, id: u64) -> Result<Option<ChannelInfo>, ChannelError>;
}

/// Resolves the configured channel once and caches it for the process.
///
/// Failures are not cached: the next call looks the channel up again, and a
/// failed readiness wait is repeated by the next call.
/// Concurrent first calls may both perform the lookup; the first one stored
/// wins and every caller gets that handle.
pub struct ChannelResolver<S> {
    session: S,
    channel_id: u64,
    ready: OnceCell<()>,
    cached: OnceLock<TargetChannel>,
}

impl<S: ChatSession> ChannelResolver<S> {
    pub fn new(session: S, channel_id: u64) -> Self {
        Self {
            session,
            channel_id,
            ready: OnceCell::new(),
            cached: OnceLock::new(),
        }
    }

    /// Resolve the target channel, logging and returning `None` on failure.
    pub async fn resolve(&self) -> Option<TargetChannel> {
        match self.try_resolve().await {
            Ok(channel) => Some(channel),
            Err(e) => {
                error!(
                    channel_id = self.channel_id,
                    error = %e,
                    "Failed to resolve notification channel"
                );
                None
            }
        }
    }

    /// Resolve the target channel, returning the failure reason.
    pub async fn try_resolve(&self) -> Result<TargetChannel, ChannelError> {
        if let Some(channel) = self.cached.get() {
            return Ok(channel.clone());
        }

        self.ready
            .get_or_try_init(|| self.session.wait_until_ready())
            .await?;

        let info = self
            .session
            .lookup_channel(self.channel_id)
            .await?
            .ok_or(ChannelError::NotFound(self.channel_id))?;
        if info.kind != ChannelKind::Text {
            return Err(ChannelError::WrongType {
                id: info.id,
                kind: info.kind,
            });
        }

        info!(channel_id = info.id, name = %info.name, "Notification channel configured");
        let resolved = TargetChannel::new(info.id, info.name);
        Ok(self.cached.get_or_init(|| resolved).clone())
    }
}
