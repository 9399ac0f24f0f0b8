use serde_json::Value;

use super::{author, code, parse_event, user_link};
use crate::github::PullRequestEvent;
use crate::message::{Color, NotificationMessage};

/// Render a `pull_request` event. Only openings and merges produce a message.
pub fn render_pull_request(payload: &Value) -> Option<NotificationMessage> {
    let event: PullRequestEvent = parse_event("pull_request", payload)?;
    let pr = event.pull_request.as_ref()?;
    let footer = format!("PR #{}", event.display_number(pr));

    match event.action.as_deref() {
        Some("opened") => Some(
            NotificationMessage::new(format!("New Pull Request: {}", pr.title), Color::Info)
                .with_url(&pr.html_url)
                .with_author(author(&pr.user))
                .with_field("Branch", code(&pr.head.ref_name), true)
                .with_field("Commits", pr.commits.to_string(), true)
                .with_field("Author", user_link(&pr.user), true)
                .with_footer(footer),
        ),
        Some("closed") if pr.merged == Some(true) => {
            let mut msg = NotificationMessage::new(
                format!("Pull Request Merged: {}", pr.title),
                Color::Merged,
            )
            .with_url(&pr.html_url);
            if let Some(merger) = &pr.merged_by {
                msg = msg.with_author(author(merger));
            }
            Some(
                msg.with_field("Branch Merged", code(&pr.head.ref_name), true)
                    .with_field("To", code(&pr.base.ref_name), true)
                    .with_field("Commits", pr.commits.to_string(), true)
                    .with_field("Author", user_link(&pr.user), true)
                    .with_footer(footer),
            )
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(action: &str, merged: bool, merged_by: Value) -> Value {
        json!({
            "action": action,
            "number": 42,
            "pull_request": {
                "number": 42,
                "title": "Fix bug",
                "html_url": "https://github.com/o/r/pull/42",
                "user": {
                    "login": "alice",
                    "avatar_url": "https://avatars/alice",
                    "html_url": "https://github.com/alice"
                },
                "head": { "ref": "fix/123" },
                "base": { "ref": "main" },
                "commits": 3,
                "merged": merged,
                "merged_by": merged_by
            }
        })
    }

    #[test]
    fn test_opened() {
        let msg = render_pull_request(&payload("opened", false, Value::Null)).unwrap();
        assert_eq!(msg.title, "New Pull Request: Fix bug");
        assert_eq!(msg.url.as_deref(), Some("https://github.com/o/r/pull/42"));
        assert_eq!(msg.color, Color::Info);
        assert_eq!(msg.field("Branch"), Some("`fix/123`"));
        assert_eq!(msg.field("Commits"), Some("3"));
        assert_eq!(
            msg.field("Author"),
            Some("[alice](https://github.com/alice)")
        );
        assert_eq!(msg.author.as_ref().unwrap().name, "alice");
        assert_eq!(msg.footer.as_deref(), Some("PR #42"));
        assert!(msg.fields.iter().all(|f| f.inline));
    }

    #[test]
    fn test_merged_with_merger() {
        let merger = json!({
            "login": "bob",
            "avatar_url": "a",
            "html_url": "https://github.com/bob"
        });
        let msg = render_pull_request(&payload("closed", true, merger)).unwrap();
        assert_eq!(msg.title, "Pull Request Merged: Fix bug");
        assert_eq!(msg.color, Color::Merged);
        assert_eq!(msg.author.as_ref().unwrap().name, "bob");
        assert_eq!(msg.field("Branch Merged"), Some("`fix/123`"));
        assert_eq!(msg.field("To"), Some("`main`"));
        assert_eq!(msg.field("Commits"), Some("3"));
        assert_eq!(
            msg.field("Author"),
            Some("[alice](https://github.com/alice)")
        );
    }

    #[test]
    fn test_merged_without_merger_has_no_author() {
        let msg = render_pull_request(&payload("closed", true, Value::Null)).unwrap();
        assert!(msg.author.is_none());
        assert_eq!(msg.footer.as_deref(), Some("PR #42"));
    }

    #[test]
    fn test_footer_falls_back_to_pull_request_number() {
        let mut p = payload("opened", false, Value::Null);
        p["pull_request"]["number"] = json!(17);
        let msg = render_pull_request(&p).unwrap();
        assert_eq!(msg.footer.as_deref(), Some("PR #42"));

        p.as_object_mut().unwrap().remove("number");
        let msg = render_pull_request(&p).unwrap();
        assert_eq!(msg.footer.as_deref(), Some("PR #17"));
    }

    #[test]
    fn test_closed_unmerged_is_ignored() {
        assert!(render_pull_request(&payload("closed", false, Value::Null)).is_none());
    }

    #[test]
    fn test_other_actions_ignored() {
        for action in ["synchronize", "reopened", "edited", "labeled"] {
            assert!(render_pull_request(&payload(action, false, Value::Null)).is_none());
        }
    }

    #[test]
    fn test_missing_pull_request_is_ignored() {
        assert!(render_pull_request(&json!({ "action": "opened", "number": 1 })).is_none());
    }

    #[test]
    fn test_incomplete_pull_request_is_ignored() {
        let mut p = payload("opened", false, Value::Null);
        p["pull_request"].as_object_mut().unwrap().remove("head");
        assert!(render_pull_request(&p).is_none());
    }

    #[test]
    fn test_render_is_idempotent() {
        let p = payload("opened", false, Value::Null);
        assert_eq!(render_pull_request(&p), render_pull_request(&p));
    }
}
