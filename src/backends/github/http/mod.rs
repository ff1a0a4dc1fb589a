pub mod middleware;

use axum::{body::Bytes, extract::Extension, http::HeaderMap};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::ErrorCode,
    relay::{relay_event, RelayOutcome, UNKNOWN_PAYLOAD},
    service::ServiceHandler,
};

use super::Event;

const GITHUB_EVENT_HEADER: &str = "x-github-event";
const SUCCESS: &str = "Success";

#[tracing::instrument(skip(body, config, services))]
pub async fn webhook(
    headers: HeaderMap,
    body: Bytes,
    config: Extension<Config>,
    services: Extension<ServiceHandler>,
) -> Result<&'static str, ErrorCode> {
    let (backlog, tracker) = services.backlog().ok_or(ErrorCode::NotConfigured)?;
    let event = classify_event(&headers, &body, backlog.subscribe_pull_requests)?;

    let outcome = relay_event(backlog, tracker, &event, config.dispatch_timeout()).await?;

    match outcome {
        RelayOutcome::Ignored => Ok(UNKNOWN_PAYLOAD),
        RelayOutcome::Skipped(_) | RelayOutcome::Dispatched(_) => Ok(SUCCESS),
    }
}

/// Decode a webhook request into an [`Event`].
///
/// Event types other than `push` (and `pull_request`, when subscribed) are
/// not errors: they come back as [`Event::Unrecognized`].
pub fn classify_event(
    headers: &HeaderMap,
    body: &[u8],
    subscribe_pull_requests: bool,
) -> Result<Event, ErrorCode> {
    let event = headers
        .get(GITHUB_EVENT_HEADER)
        .ok_or(ErrorCode::MissingEventHeader)?
        .to_str()
        .map_err(|_| ErrorCode::MalformedEventHeader)?;

    match event {
        "push" => Ok(Event::Push(parse_body(body)?)),
        "pull_request" if subscribe_pull_requests => Ok(Event::PullRequest(parse_body(body)?)),
        other => Ok(Event::Unrecognized(other.to_owned())),
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ErrorCode> {
    serde_json::from_slice(body).map_err(ErrorCode::MalformedEventBody)
}
