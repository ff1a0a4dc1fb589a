use std::fmt;

use serde::{Deserialize, Serialize};

use crate::git::RefType;

/// Webhook payload, discriminated by the `X-GitHub-Event` header.
#[derive(Debug, Clone)]
pub enum Event {
    Push(PushEvent),
    PullRequest(PullRequestEvent),
    /// Event type the relay does not act upon (e.g. `ping`).
    Unrecognized(String),
}

impl Event {
    pub fn kind(&self) -> &str {
        match self {
            Self::Push(_) => "push",
            Self::PullRequest(_) => "pull_request",
            Self::Unrecognized(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    pub fn ref_type(&self) -> RefType {
        RefType::from(self.reference.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Commit {
    pub id: String,
    pub url: String,
    pub message: String,
    pub author: CommitUser,
    pub committer: CommitUser,
}

impl Commit {
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestEvent {
    pub action: PullRequestAction,
    pub pull_request: PullRequest,
}

impl PullRequestEvent {
    pub fn head_ref(&self) -> RefType {
        RefType::from(self.pull_request.head.reference.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Pull request lifecycle action; unknown actions are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PullRequestAction {
    Opened,
    Closed,
    Reopened,
    Synchronize,
    Edited,
    ReadyForReview,
    Other(String),
}

impl PullRequestAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Synchronize => "synchronize",
            Self::Edited => "edited",
            Self::ReadyForReview => "ready_for_review",
            Self::Other(action) => action,
        }
    }
}

impl From<String> for PullRequestAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "opened" => Self::Opened,
            "closed" => Self::Closed,
            "reopened" => Self::Reopened,
            "synchronize" => Self::Synchronize,
            "edited" => Self::Edited,
            "ready_for_review" => Self::ReadyForReview,
            _ => Self::Other(value),
        }
    }
}

impl From<PullRequestAction> for String {
    fn from(value: PullRequestAction) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
