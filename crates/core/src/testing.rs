//! In-memory session and sink for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::channel::{ChannelError, ChannelInfo, ChannelKind, ChatSession, TargetChannel};
use crate::delivery::{DeliveryError, DeliverySink};
use crate::message::NotificationMessage;

/// Session backed by a fixed channel table. Always ready.
#[derive(Clone, Default)]
pub struct StaticSession {
    channels: Arc<HashMap<u64, ChannelInfo>>,
    lookups: Arc<AtomicUsize>,
}

impl StaticSession {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_channel(info: ChannelInfo) -> Self {
        Self {
            channels: Arc::new(HashMap::from([(info.id, info)])),
            lookups: Arc::default(),
        }
    }

    pub fn with_text_channel(id: u64, name: &str) -> Self {
        Self::with_channel(ChannelInfo {
            id,
            name: name.to_string(),
            kind: ChannelKind::Text,
        })
    }

    /// Number of lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSession for StaticSession {
    async fn wait_until_ready(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn lookup_channel(&self, id: u64) -> Result<Option<ChannelInfo>, ChannelError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.channels.get(&id).cloned())
    }
}

type FailWith = Arc<dyn Fn() -> DeliveryError + Send + Sync>;

/// Sink that records every message, or fails every send.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(u64, NotificationMessage)>>>,
    fail_with: Option<FailWith>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: impl Fn() -> DeliveryError + Send + Sync + 'static) -> Self {
        Self {
            sent: Arc::default(),
            fail_with: Some(Arc::new(error)),
        }
    }

    /// Messages delivered so far, with the channel id they went to.
    pub fn sent(&self) -> Vec<(u64, NotificationMessage)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn send(
        &self,
        channel: &TargetChannel,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        if let Some(fail) = &self.fail_with {
            return Err(fail());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((channel.id(), message.clone()));
        }
        Ok(())
    }
}
