//! Webhook dispatch: verify → parse → route → render → deliver.
//!
//! Only authentication and malformed requests are errors. Once a request is
//! authenticated and parsed it is acknowledged, whatever happens to the
//! notification afterwards, so GitHub never retries a delivery we understood.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::channel::{ChannelResolver, ChatSession};
use crate::delivery::{DeliveryError, DeliverySink};
use crate::request::WebhookRequest;
use crate::router::{route, RoutingKey};
use crate::signature::{check_signature, SignatureError};

/// How an acknowledged request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A message was sent to the channel.
    Delivered,
    /// Event type or action we do not notify on.
    Ignored,
    /// The channel could not be resolved; the message was dropped.
    ChannelUnavailable,
    /// The chat platform refused or failed the send; the message was dropped.
    DeliveryFailed,
}

/// Requests rejected before routing.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid signature: {0}")]
    Unauthorized(#[from] SignatureError),

    #[error("missing X-GitHub-Event header")]
    MissingEventHeader,

    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub struct Dispatcher<S, D> {
    secret: Vec<u8>,
    resolver: Arc<ChannelResolver<S>>,
    sink: D,
}

impl<S, D> Dispatcher<S, D>
where
    S: ChatSession,
    D: DeliverySink,
{
    pub fn new(secret: impl Into<Vec<u8>>, resolver: Arc<ChannelResolver<S>>, sink: D) -> Self {
        Self {
            secret: secret.into(),
            resolver,
            sink,
        }
    }

    /// Process one webhook delivery.
    pub async fn handle(&self, request: &WebhookRequest) -> Result<Outcome, DispatchError> {
        if let Err(reason) = check_signature(request.body(), request.signature(), &self.secret) {
            warn!(reason = %reason, "Webhook request rejected");
            return Err(reason.into());
        }

        let Some(event_type) = request.event_type() else {
            warn!("Webhook request missing X-GitHub-Event header");
            return Err(DispatchError::MissingEventHeader);
        };

        let payload = request.payload().map_err(|e| {
            error!(event = %event_type, error = %e, "Failed to parse webhook JSON");
            DispatchError::from(e)
        })?;

        let key = RoutingKey::new(event_type, &payload);
        info!(event = %key, "Received GitHub webhook");

        let Some(message) = route(event_type, &payload) else {
            debug!(event = %key, "Nothing to notify");
            return Ok(Outcome::Ignored);
        };

        let Some(channel) = self.resolver.resolve().await else {
            warn!(event = %key, "Notification channel unavailable, dropping message");
            return Ok(Outcome::ChannelUnavailable);
        };

        match self.sink.send(&channel, &message).await {
            Ok(()) => {
                info!(
                    event = %key,
                    channel = %channel.name(),
                    title = %message.title,
                    "Notification sent"
                );
                Ok(Outcome::Delivered)
            }
            Err(DeliveryError::PermissionDenied) => {
                error!(
                    channel = %channel.name(),
                    "No permission to send messages in notification channel"
                );
                Ok(Outcome::DeliveryFailed)
            }
            Err(e) => {
                error!(event = %key, error = %e, "Failed to send notification");
                Ok(Outcome::DeliveryFailed)
            }
        }
    }
}
