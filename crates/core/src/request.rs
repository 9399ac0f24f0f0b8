//! Inbound webhook request as seen by the dispatcher.

use std::collections::BTreeMap;

/// Header carrying the HMAC signature of the body.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";
/// Header carrying the GitHub event type.
pub const HEADER_EVENT: &str = "x-github-event";

/// A webhook delivery: raw body plus headers.
///
/// Header names are stored lowercased, so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    body: Vec<u8>,
    headers: BTreeMap<String, String>,
}

impl WebhookRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn signature(&self) -> Option<&str> {
        self.header(HEADER_SIGNATURE)
    }

    /// Event type, ignoring an empty header value.
    pub fn event_type(&self) -> Option<&str> {
        self.header(HEADER_EVENT).filter(|e| !e.is_empty())
    }

    /// Parse the body as a JSON tree.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
