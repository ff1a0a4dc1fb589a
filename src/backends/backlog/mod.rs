mod apiclient;
mod error;
mod service;

pub use apiclient::*;
pub use error::BacklogError;
pub use service::IssueTracker;
