//! Event-type routing.

use std::fmt;

use serde_json::Value;

use crate::message::NotificationMessage;
use crate::render;

/// GitHub event types we render. Anything else is [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    WorkflowRun,
    IssueComment,
    PullRequestReviewComment,
    Other(String),
}

impl EventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "pull_request" => Self::PullRequest,
            "workflow_run" => Self::WorkflowRun,
            "issue_comment" => Self::IssueComment,
            "pull_request_review_comment" => Self::PullRequestReviewComment,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PullRequest => "pull_request",
            Self::WorkflowRun => "workflow_run",
            Self::IssueComment => "issue_comment",
            Self::PullRequestReviewComment => "pull_request_review_comment",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type plus the payload's `action`, for lookups and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingKey {
    pub kind: EventKind,
    pub action: Option<String>,
}

impl RoutingKey {
    pub fn new(event_type: &str, payload: &Value) -> Self {
        Self {
            kind: EventKind::parse(event_type),
            action: payload
                .get("action")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}/{action}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Route a payload to its renderer.
///
/// Unknown event types and payloads a renderer declines both yield `None`.
pub fn route(event_type: &str, payload: &Value) -> Option<NotificationMessage> {
    match EventKind::parse(event_type) {
        EventKind::PullRequest => render::render_pull_request(payload),
        EventKind::WorkflowRun => render::render_workflow_run(payload),
        EventKind::IssueComment => render::render_issue_comment(payload),
        EventKind::PullRequestReviewComment => render::render_review_comment(payload),
        EventKind::Other(_) => None,
    }
}
