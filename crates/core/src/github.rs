//! GitHub webhook payload shapes.
//!
//! Only the fields the renderers read are modelled. A required field that is
//! missing makes the whole event fail to deserialize, which the renderers treat
//! as "nothing to notify". `Option` fields are the ones whose absence only
//! drops a part of the message.

#![allow(dead_code)] // Some fields only exist to document the payload shape

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// `pull_request` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: Option<String>,
    pub number: Option<u64>,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: User,
    pub head: GitRef,
    pub base: GitRef,
    pub commits: u64,
    pub merged: Option<bool>,
    pub merged_by: Option<User>,
}

impl PullRequestEvent {
    /// Number shown in the footer: the event's own, else the pull request's.
    pub fn display_number(&self, pr: &PullRequest) -> u64 {
        self.number.unwrap_or(pr.number)
    }
}

/// `workflow_run` event.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunEvent {
    pub action: Option<String>,
    pub workflow_run: Option<WorkflowRun>,
    pub workflow: Option<Workflow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub conclusion: Option<String>,
    pub head_branch: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub pull_requests: Vec<LinkedPullRequest>,
    pub actor: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedPullRequest {
    pub number: Option<u64>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workflow {
    pub name: String,
}

impl WorkflowRun {
    /// First linked pull request's page, else the run's own page.
    pub fn link(&self) -> Option<&str> {
        self.pull_requests
            .first()
            .and_then(|pr| pr.html_url.as_deref())
            .filter(|url| !url.is_empty())
            .or(self.html_url.as_deref())
    }
}

/// `issue_comment` event.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    pub action: Option<String>,
    pub issue: Option<Issue>,
    pub comment: Option<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    /// Present only when the issue is a pull request. A present `null`
    /// still counts.
    #[serde(default, deserialize_with = "present")]
    pub pull_request: Option<serde_json::Value>,
}

/// `Some` whenever the key is in the payload, even with a `null` value.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub html_url: String,
    pub body: Option<String>,
    pub user: User,
    pub path: Option<String>,
    pub line: Option<u64>,
}

/// `pull_request_review_comment` event.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCommentEvent {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestSummary>,
    pub comment: Option<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
}
