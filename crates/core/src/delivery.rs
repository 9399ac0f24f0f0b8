//! Outbound delivery of rendered messages.

use async_trait::async_trait;

use crate::channel::TargetChannel;
use crate::message::NotificationMessage;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The bot may not post in the channel.
    #[error("missing permission to send messages")]
    PermissionDenied,

    #[error("delivery failed: {0}")]
    Transport(String),
}

/// Sends a message to the resolved channel.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send(
        &self,
        channel: &TargetChannel,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError>;
}
