use serde_json::Value;

use super::{author, code, parse_event};
use crate::github::{Comment, IssueCommentEvent, ReviewCommentEvent};
use crate::message::{Color, NotificationMessage};

fn comment_message(title: String, comment: &Comment, number: u64) -> NotificationMessage {
    NotificationMessage::new(title, Color::Neutral)
        .with_url(&comment.html_url)
        .with_description(comment.body.as_deref().unwrap_or_default())
        .with_author(author(&comment.user))
        .with_footer(format!("PR #{number}"))
}

/// Render a new comment on a pull request's conversation.
///
/// Comments on plain issues are ignored.
pub fn render_issue_comment(payload: &Value) -> Option<NotificationMessage> {
    let event: IssueCommentEvent = parse_event("issue_comment", payload)?;
    if event.action.as_deref() != Some("created") {
        return None;
    }
    let issue = event.issue.as_ref().filter(|i| i.is_pull_request())?;
    let comment = event.comment.as_ref()?;

    Some(comment_message(
        format!("New Comment on PR: {}", issue.title),
        comment,
        issue.number,
    ))
}

/// Render a new review comment on a pull request diff.
pub fn render_review_comment(payload: &Value) -> Option<NotificationMessage> {
    let event: ReviewCommentEvent = parse_event("pull_request_review_comment", payload)?;
    if event.action.as_deref() != Some("created") {
        return None;
    }
    let pr = event.pull_request.as_ref()?;
    let comment = event.comment.as_ref()?;

    let mut msg = comment_message(
        format!("Review Comment on PR: {}", pr.title),
        comment,
        pr.number,
    );
    if let Some(path) = comment.path.as_deref().filter(|p| !p.is_empty()) {
        msg = msg.with_field("File", code(path), true);
    }
    if let Some(line) = comment.line.filter(|l| *l > 0) {
        msg = msg.with_field("Line", line.to_string(), true);
    }
    Some(msg)
}
