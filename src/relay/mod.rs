//! Event to Backlog notification pipeline.

mod dispatch;
mod format;
mod ticket;

use std::time::Duration;

use thiserror::Error;

use crate::{
    backends::{
        backlog::IssueTracker,
        github::{Event, PullRequestAction},
    },
    config::BacklogConfig,
};

pub use self::dispatch::{
    dispatch, DispatchError, DispatchPlan, DispatchReport, DispatchStatus, TicketOutcome,
};
pub use self::format::{MessageFormatter, UNKNOWN_PAYLOAD};
pub use self::ticket::{TicketError, TicketId, TicketPattern, TicketSet};

#[cfg(test)]
pub(crate) use self::dispatch::tests::FakeTracker;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Ticket(#[from] TicketError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Event type the relay does not handle.
    Ignored,
    /// Handled event that does not warrant a notification.
    Skipped(PullRequestAction),
    Dispatched(DispatchReport),
}

/// Tickets referenced by the event: the branch name, plus every commit
/// message for pushes.
pub fn collect_tickets(event: &Event, pattern: &TicketPattern) -> TicketSet {
    let mut tickets = TicketSet::new();

    match event {
        Event::Push(push) => {
            tickets.extend_from(pattern, push.ref_type().display_name());
            for commit in &push.commits {
                tickets.extend_from(pattern, &commit.message);
            }
        }
        Event::PullRequest(pr) => tickets.extend_from(pattern, pr.head_ref().display_name()),
        Event::Unrecognized(_) => {}
    }

    tickets
}

#[tracing::instrument(skip(config, tracker, event), fields(event = event.kind()))]
pub async fn relay_event(
    config: &BacklogConfig,
    tracker: &dyn IssueTracker,
    event: &Event,
    deadline: Duration,
) -> Result<RelayOutcome, RelayError> {
    let formatter = MessageFormatter::new(config.notify_on_all_commits);

    let plan = match event {
        Event::Unrecognized(kind) => {
            tracing::debug!(event = %kind, "ignoring event");
            return Ok(RelayOutcome::Ignored);
        }
        Event::PullRequest(pr) if pr.action == PullRequestAction::Synchronize => {
            tracing::debug!(number = pr.pull_request.number, "skipping synchronize action");
            return Ok(RelayOutcome::Skipped(pr.action.clone()));
        }
        Event::Push(_) => DispatchPlan::comment(formatter.format(event)),
        Event::PullRequest(pr) => DispatchPlan::comment_and_field(
            formatter.format(event),
            format!("{}({})", pr.pull_request.number, pr.action),
        ),
    };

    let pattern = TicketPattern::new(&config.project_key, config.require_hyphen_in_ticket_id)?;
    let tickets = collect_tickets(event, &pattern);
    tracing::info!(
        pattern = pattern.as_str(),
        count = tickets.len(),
        tickets = %tickets,
        "tickets referenced"
    );

    let report = dispatch(tracker, &tickets, &plan, deadline).await?;
    tracing::info!(report = %report, "notifications sent");

    Ok(RelayOutcome::Dispatched(report))
}
