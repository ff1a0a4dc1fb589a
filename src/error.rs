use reqwest::StatusCode;
use thiserror::Error;

use crate::relay::{DispatchError, RelayError};

#[derive(Debug, Error)]
pub enum ErrorCode {
    MissingEventHeader,
    InvalidSignature,
    MalformedEventHeader,
    MalformedEventBody(#[from] serde_json::Error),
    NotConfigured,
    RelayFailed(RelayError),
    /// Tickets reached before the deadline are listed in the carried report.
    DispatchTimedOut(RelayError),
    UnhandledError(String),
}

/// Response details for an [`ErrorCode`].
///
/// Only the generic reason phrase of the status code reaches the client; the
/// message is meant for logs.
pub struct ErrorCodeDetail {
    status_code: StatusCode,
    internal_code: u32,
    message: String,
}

impl ErrorCode {
    pub fn details(&self) -> ErrorCodeDetail {
        self.into()
    }
}

impl ErrorCodeDetail {
    pub fn with_status_code<T: Into<String>>(
        status_code: StatusCode,
        internal_code: u32,
        message: T,
    ) -> Self {
        Self {
            internal_code,
            status_code,
            message: message.into(),
        }
    }

    pub fn server_error<T: Into<String>>(internal_code: u32, message: T) -> Self {
        Self::with_status_code(StatusCode::INTERNAL_SERVER_ERROR, internal_code, message)
    }

    pub fn unavailable<T: Into<String>>(internal_code: u32, message: T) -> Self {
        Self::with_status_code(StatusCode::SERVICE_UNAVAILABLE, internal_code, message)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn internal_code(&self) -> u32 {
        self.internal_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Body sent to the client, e.g. `Internal Server Error`.
    pub fn public_message(&self) -> &'static str {
        self.status_code
            .canonical_reason()
            .unwrap_or("Internal Server Error")
    }
}

impl From<&ErrorCode> for ErrorCodeDetail {
    fn from(value: &ErrorCode) -> Self {
        match value {
            ErrorCode::MissingEventHeader => Self::server_error(1, "Missing X-GitHub-Event header"),
            ErrorCode::InvalidSignature => {
                Self::server_error(2, "Invalid X-Hub-Signature-256 signature")
            }
            ErrorCode::MalformedEventHeader => Self::server_error(3, "Malformed event header"),
            ErrorCode::MalformedEventBody(e) => {
                Self::server_error(4, format!("Malformed event body: '{}'", e))
            }
            ErrorCode::NotConfigured => {
                Self::unavailable(5, "Backlog configuration is missing or invalid")
            }
            ErrorCode::RelayFailed(e) => Self::server_error(6, format!("Relay failed: '{}'", e)),
            ErrorCode::DispatchTimedOut(e) => {
                Self::server_error(7, format!("Backlog notifications timed out: '{}'", e))
            }
            ErrorCode::UnhandledError(e) => {
                Self::server_error(99, format!("Unhandled error: '{}'", e))
            }
        }
    }
}

impl From<RelayError> for ErrorCode {
    fn from(value: RelayError) -> Self {
        match value {
            RelayError::Dispatch(DispatchError::TimedOut { .. }) => Self::DispatchTimedOut(value),
            other => Self::RelayFailed(other),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let detail = ErrorCodeDetail::from(self);
        f.write_str(&detail.message)
    }
}
