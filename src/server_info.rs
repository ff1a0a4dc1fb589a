use serde::Serialize;

pub const APP_NAME: &str = "backlogrelay";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Payload of `GET /`.
#[derive(Serialize)]
pub struct ServerInfo {
    message: String,
    version: String,
    /// Whether webhooks will be relayed or refused.
    backlog_configured: bool,
}

impl ServerInfo {
    pub fn new(backlog_configured: bool) -> Self {
        let message = if backlog_configured {
            format!("{APP_NAME}, ready for action!")
        } else {
            format!("{APP_NAME}, waiting for a Backlog configuration.")
        };

        Self {
            message,
            version: APP_VERSION.into(),
            backlog_configured,
        }
    }
}
