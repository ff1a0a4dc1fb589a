use std::any::Any;

use async_trait::async_trait;

use crate::relay::TicketId;

use super::BacklogError;

/// Outbound operations the relay needs from the issue tracker.
#[async_trait]
pub trait IssueTracker: std::fmt::Debug + Send + Sync {
    async fn add_comment(&self, ticket: &TicketId, content: &str) -> Result<(), BacklogError>;
    async fn update_custom_field(&self, ticket: &TicketId, value: &str)
        -> Result<(), BacklogError>;

    fn as_any(&self) -> &dyn Any;
}
