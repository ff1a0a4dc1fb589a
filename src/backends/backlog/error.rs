use thiserror::Error;

use crate::relay::TicketId;

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("malformed Backlog API URL for issue {0}.")]
    MalformedUrl(TicketId, #[source] url::ParseError),

    #[error("error while adding comment to issue {0}.")]
    CouldNotAddComment(TicketId, #[source] reqwest::Error),

    #[error("error while updating issue {0}.")]
    CouldNotUpdateIssue(TicketId, #[source] reqwest::Error),

    #[error("error code {1} received from Backlog for issue {0}.")]
    BadStatusCode(TicketId, reqwest::StatusCode),
}
