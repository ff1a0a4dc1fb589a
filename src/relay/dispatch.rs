use std::{fmt, time::Duration};

use thiserror::Error;

use crate::backends::backlog::{BacklogError, IssueTracker};

use super::{TicketId, TicketSet};

/// What to send to every ticket of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    pub message: String,
    /// Custom field value, only set for pull requests.
    pub field_value: Option<String>,
}

impl DispatchPlan {
    pub fn comment<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
            field_value: None,
        }
    }

    pub fn comment_and_field<T: Into<String>>(message: T, field_value: T) -> Self {
        Self {
            message: message.into(),
            field_value: Some(field_value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Delivered,
    Failed(String),
    /// In flight when the deadline expired; the tracker may or may not have
    /// applied it.
    Interrupted,
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOutcome {
    pub ticket: TicketId,
    pub status: DispatchStatus,
}

/// Per-ticket result of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    outcomes: Vec<TicketOutcome>,
}

impl DispatchReport {
    pub fn outcomes(&self) -> &[TicketOutcome] {
        &self.outcomes
    }

    pub fn delivered(&self) -> impl Iterator<Item = &TicketId> {
        self.with_status(|s| matches!(s, DispatchStatus::Delivered))
    }

    pub fn not_attempted(&self) -> impl Iterator<Item = &TicketId> {
        self.with_status(|s| matches!(s, DispatchStatus::NotAttempted))
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == DispatchStatus::Delivered)
    }

    fn with_status<F>(&self, filter: F) -> impl Iterator<Item = &TicketId>
    where
        F: Fn(&DispatchStatus) -> bool,
    {
        self.outcomes
            .iter()
            .filter(move |o| filter(&o.status))
            .map(|o| &o.ticket)
    }

    fn push(&mut self, ticket: &TicketId, status: DispatchStatus) {
        self.outcomes.push(TicketOutcome {
            ticket: ticket.clone(),
            status,
        });
    }

    /// Record every ticket without an outcome yet, the first one as
    /// `in_flight` and the rest as not attempted.
    fn close(&mut self, tickets: &TicketSet, in_flight: DispatchStatus) {
        let mut pending = tickets.iter().skip(self.outcomes.len());
        if let Some(ticket) = pending.next() {
            self.push(ticket, in_flight);
        }
        for ticket in pending {
            self.push(ticket, DispatchStatus::NotAttempted);
        }
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<_> = self
            .outcomes
            .iter()
            .map(|o| {
                let status = match &o.status {
                    DispatchStatus::Delivered => "delivered",
                    DispatchStatus::Failed(_) => "failed",
                    DispatchStatus::Interrupted => "interrupted",
                    DispatchStatus::NotAttempted => "not attempted",
                };
                format!("{}: {status}", o.ticket)
            })
            .collect();
        write!(f, "{}", entries.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch aborted on issue {ticket} ({report}).")]
    Aborted {
        ticket: TicketId,
        report: DispatchReport,
        #[source]
        source: BacklogError,
    },
    #[error("dispatch deadline of {}s expired ({report}).", .deadline.as_secs_f32())]
    TimedOut {
        deadline: Duration,
        report: DispatchReport,
    },
}

impl DispatchError {
    pub fn report(&self) -> &DispatchReport {
        match self {
            Self::Aborted { report, .. } | Self::TimedOut { report, .. } => report,
        }
    }
}

/// Notify every ticket in turn, stopping at the first failure or when
/// `deadline` expires.
///
/// Tickets already notified stay notified; the returned report (or the one
/// inside the error) tells which ones.
#[tracing::instrument(skip(tracker, plan), fields(tickets = %tickets))]
pub async fn dispatch(
    tracker: &dyn IssueTracker,
    tickets: &TicketSet,
    plan: &DispatchPlan,
    deadline: Duration,
) -> Result<DispatchReport, DispatchError> {
    let mut report = DispatchReport::default();
    let result =
        tokio::time::timeout(deadline, notify_all(tracker, tickets, plan, &mut report)).await;

    match result {
        Ok(Ok(())) => Ok(report),
        Ok(Err((ticket, source))) => {
            tracing::error!(ticket = %ticket, error = %source, "could not notify issue");
            report.close(tickets, DispatchStatus::Failed(source.to_string()));
            Err(DispatchError::Aborted {
                ticket,
                report,
                source,
            })
        }
        Err(_) => {
            report.close(tickets, DispatchStatus::Interrupted);
            tracing::error!(report = %report, "dispatch deadline expired");
            Err(DispatchError::TimedOut { deadline, report })
        }
    }
}

async fn notify_all(
    tracker: &dyn IssueTracker,
    tickets: &TicketSet,
    plan: &DispatchPlan,
    report: &mut DispatchReport,
) -> Result<(), (TicketId, BacklogError)> {
    for ticket in tickets {
        notify_ticket(tracker, ticket, plan)
            .await
            .map_err(|e| (ticket.clone(), e))?;
        report.push(ticket, DispatchStatus::Delivered);
    }

    Ok(())
}

async fn notify_ticket(
    tracker: &dyn IssueTracker,
    ticket: &TicketId,
    plan: &DispatchPlan,
) -> Result<(), BacklogError> {
    tracker.add_comment(ticket, &plan.message).await?;

    if let Some(value) = &plan.field_value {
        tracker.update_custom_field(ticket, value).await?;
    }

    Ok(())
}
