pub mod backlog;
pub mod github;
