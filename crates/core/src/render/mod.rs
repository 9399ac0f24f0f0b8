//! Payload → notification renderers.
//!
//! Each renderer is a pure function of the payload: it returns `None` when the
//! action is not one we notify on, or when the payload lacks the parts the
//! message needs. Neither case is an error.

mod comment;
mod pull_request;
mod workflow_run;

pub use comment::{render_issue_comment, render_review_comment};
pub use pull_request::render_pull_request;
pub use workflow_run::render_workflow_run;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::github::User;
use crate::message::Author;

/// Deserialize a typed event out of the generic payload.
fn parse_event<'a, T: Deserialize<'a>>(event: &str, payload: &'a Value) -> Option<T> {
    match T::deserialize(payload) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(event = %event, error = %e, "Payload lacks expected fields, skipping");
            None
        }
    }
}

fn author(user: &User) -> Author {
    Author {
        name: user.login.clone(),
        icon_url: user.avatar_url.clone(),
        url: user.html_url.clone(),
    }
}

/// Markdown link to a user's profile, or the bare login.
fn user_link(user: &User) -> String {
    match &user.html_url {
        Some(url) => format!("[{}]({url})", user.login),
        None => user.login.clone(),
    }
}

/// Inline code span.
fn code(text: &str) -> String {
    format!("`{text}`")
}
