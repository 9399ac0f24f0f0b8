//! Notification message built from a webhook payload.
//!
//! A message is chat-platform neutral: the delivery adapter decides how a
//! [`Color`] or an [`Author`] block is drawn.

use serde::Serialize;

/// Maximum length of a message body, in characters.
pub const MAX_BODY_CHARS: usize = 1024;

/// Marker appended to a body that was cut at [`MAX_BODY_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

/// Color/severity tag of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Something new to look at (opened pull request).
    Info,
    /// A pull request landed.
    Merged,
    Success,
    Failure,
    /// Conversation (comments).
    Neutral,
}

/// Who triggered the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub icon_url: Option<String>,
    pub url: Option<String>,
}

/// A labelled value shown alongside the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A rendered notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Color,
    pub author: Option<Author>,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, color: Color) -> Self {
        Self {
            title: title.into(),
            url: None,
            description: None,
            color,
            author: None,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the body text, truncating it to [`MAX_BODY_CHARS`].
    pub fn with_description(mut self, text: &str) -> Self {
        self.description = Some(truncate_body(text));
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Look up a field value by label.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Cut `text` to at most [`MAX_BODY_CHARS`] characters.
///
/// Longer text keeps its first `MAX_BODY_CHARS - 3` characters and ends with
/// [`TRUNCATION_MARKER`], so the result is exactly `MAX_BODY_CHARS` long.
pub fn truncate_body(text: &str) -> String {
    if text.chars().count() <= MAX_BODY_CHARS {
        return text.to_string();
    }
    let keep = MAX_BODY_CHARS - TRUNCATION_MARKER.chars().count();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(2000);
        let out = truncate_body(&body);
        assert_eq!(out.chars().count(), 1024);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..1021], &body[..1021]);
    }

    #[test]
    fn test_short_body_unmodified() {
        let body = "y".repeat(500);
        assert_eq!(truncate_body(&body), body);
    }

    #[test]
    fn test_exact_limit_unmodified() {
        let body = "z".repeat(1024);
        assert_eq!(truncate_body(&body), body);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let body = "é".repeat(1500);
        let out = truncate_body(&body);
        assert_eq!(out.chars().count(), 1024);
        assert!(out.starts_with("ééé"));
    }

    #[test]
    fn test_builder_keeps_field_order() {
        let msg = NotificationMessage::new("t", Color::Info)
            .with_field("A", "1", true)
            .with_field("B", "2", false);
        let names: Vec<_> = msg.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(msg.field("B"), Some("2"));
        assert_eq!(msg.field("C"), None);
    }
}
