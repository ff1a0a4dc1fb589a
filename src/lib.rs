//! Relay GitHub push and pull request webhooks to Backlog issues.
//!
//! Ticket keys found in branch names and commit messages receive a comment
//! describing the event; pull requests also update a custom field.

pub mod backends;
pub mod cmdargs;
pub mod config;
pub mod crypto;
pub mod error;
pub mod git;
pub mod http;
pub mod logging;
pub mod relay;
pub mod server_info;
pub mod service;
