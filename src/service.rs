use std::sync::Arc;

use crate::{
    backends::backlog::{self, IssueTracker},
    config::{BacklogConfig, Config},
};

#[derive(Debug, Clone)]
struct BacklogServices {
    config: Arc<BacklogConfig>,
    tracker: Arc<dyn IssueTracker>,
}

/// Shared request dependencies. Without a Backlog configuration, webhooks are
/// refused.
#[derive(Debug, Clone)]
pub struct ServiceHandler {
    backlog: Option<BacklogServices>,
}

impl ServiceHandler {
    pub fn new(config: Arc<BacklogConfig>, tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            backlog: Some(BacklogServices { config, tracker }),
        }
    }

    pub fn unconfigured() -> Self {
        Self { backlog: None }
    }

    pub fn new_defaults(config: &Config) -> Result<Self, reqwest::Error> {
        Self::from_backlog_config(config, BacklogConfig::get_or_load(config.config_path()))
    }

    /// Wire the Backlog client for an already loaded configuration.
    pub fn from_backlog_config(
        config: &Config,
        backlog_config: Option<Arc<BacklogConfig>>,
    ) -> Result<Self, reqwest::Error> {
        match backlog_config {
            Some(backlog_config) => {
                let client =
                    backlog::Client::from_config(&backlog_config, config.backlog_api_url())?;
                Ok(Self::new(backlog_config, Arc::new(client)))
            }
            None => Ok(Self::unconfigured()),
        }
    }

    pub fn backlog(&self) -> Option<(&BacklogConfig, &dyn IssueTracker)> {
        self.backlog
            .as_ref()
            .map(|b| (b.config.as_ref(), b.tracker.as_ref()))
    }
}
