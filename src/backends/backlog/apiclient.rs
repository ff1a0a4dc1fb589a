use std::{any::Any, fmt, time::Duration};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{
    config::BacklogConfig,
    relay::TicketId,
    server_info::{APP_NAME, APP_VERSION},
};

use super::{BacklogError, IssueTracker};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Backlog REST API v2 client.
///
/// The API key is sent as the `apiKey` query parameter, as Backlog expects.
pub struct Client {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    custom_field_id: u64,
}

impl Client {
    pub fn new<T: Into<String>>(
        api_url: T,
        api_key: T,
        custom_field_id: u64,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("{APP_NAME}/{APP_VERSION}"))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            custom_field_id,
        })
    }

    /// Build a client for the configured space, unless `api_url` overrides
    /// the computed `https://<space>.<domain>` root.
    pub fn from_config(
        config: &BacklogConfig,
        api_url: Option<&str>,
    ) -> Result<Self, reqwest::Error> {
        let api_url = api_url
            .map(|u| u.to_owned())
            .unwrap_or_else(|| config.api_url());

        Self::new(api_url, config.api_key.clone(), config.custom_field_id)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn issue_url(&self, ticket: &TicketId, suffix: &str) -> Result<Url, BacklogError> {
        let root_url = self.api_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{root_url}/api/v2/issues/{ticket}{suffix}"))
            .map_err(|e| BacklogError::MalformedUrl(ticket.clone(), e))?;
        url.query_pairs_mut().append_pair("apiKey", &self.api_key);

        Ok(url)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .field("custom_field_id", &self.custom_field_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IssueTracker for Client {
    #[tracing::instrument(skip(self, content), fields(ticket = %ticket))]
    async fn add_comment(&self, ticket: &TicketId, content: &str) -> Result<(), BacklogError> {
        let url = self.issue_url(ticket, "/comments")?;
        let resp = self
            .http
            .post(url)
            .form(&[("content", content)])
            .send()
            .await
            .map_err(|e| BacklogError::CouldNotAddComment(ticket.clone(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BacklogError::BadStatusCode(ticket.clone(), status));
        }

        tracing::info!(message = "Comment added", ticket = %ticket);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(ticket = %ticket))]
    async fn update_custom_field(
        &self,
        ticket: &TicketId,
        value: &str,
    ) -> Result<(), BacklogError> {
        let url = self.issue_url(ticket, "")?;
        let field = format!("customField_{}", self.custom_field_id);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(&field, value)
            .finish();

        let resp = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| BacklogError::CouldNotUpdateIssue(ticket.clone(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BacklogError::BadStatusCode(ticket.clone(), status));
        }

        tracing::info!(message = "Custom field updated", ticket = %ticket, field = %field, value = value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
