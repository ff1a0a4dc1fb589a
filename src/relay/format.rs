use std::fmt::Write;

use crate::backends::github::{Commit, CommitUser, Event, PullRequestEvent, PushEvent};

/// Body written back for events the relay ignores.
pub const UNKNOWN_PAYLOAD: &str = "Unknown payload";

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter {
    notify_on_all_commits: bool,
}

impl MessageFormatter {
    pub fn new(notify_on_all_commits: bool) -> Self {
        Self {
            notify_on_all_commits,
        }
    }

    pub fn format(&self, event: &Event) -> String {
        match event {
            Event::Push(push) => self.format_push(push),
            Event::PullRequest(pr) => self.format_pull_request(pr),
            Event::Unrecognized(_) => UNKNOWN_PAYLOAD.into(),
        }
    }

    pub fn format_push(&self, push: &PushEvent) -> String {
        let reference = push.ref_type();
        let branch = reference.display_name();
        let mut message = String::new();

        let action = if push.created {
            Some("created")
        } else if push.deleted {
            Some("deleted")
        } else {
            None
        };

        if let Some(action) = action {
            let _ = writeln!(message, "{branch} {action}");
        }

        if self.notify_on_all_commits {
            for commit in &push.commits {
                write_commit(&mut message, commit, &commit.author, branch);
            }
        } else if let Some(commit) = push.commits.last() {
            write_commit(&mut message, commit, &commit.committer, branch);
        }

        message
    }

    pub fn format_pull_request(&self, pr: &PullRequestEvent) -> String {
        format!("PR {} {}", pr.pull_request.html_url, pr.action)
    }
}

fn write_commit(message: &mut String, commit: &Commit, user: &CommitUser, branch: &str) {
    let _ = write!(
        message,
        "\n[{}]({}) ({})\n> {}\n> by {}({}) <{}>\n",
        commit.short_id(),
        commit.url,
        branch,
        quote(&commit.message),
        user.username.as_deref().unwrap_or_default(),
        user.name,
        user.email,
    );
}

fn quote(message: &str) -> String {
    message.trim().replace('\n', "\n> ")
}
