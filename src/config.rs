use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use once_cell::sync::OnceCell;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
pub const DEFAULT_BACKLOG_DOMAIN: &str = "backlog.jp";
pub const DEFAULT_CUSTOM_FIELD_ID: u64 = 69737;
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Malformed bind IP: '{0}'. Make sure you entered a valid IP.")]
    MalformedBindIp(String),
    #[error("Malformed dispatch timeout: '{0}'. Expected a positive number of seconds.")]
    MalformedDispatchTimeout(String),
    #[error("Could not read configuration file '{}'.", .0.display())]
    UnreadableFile(PathBuf, #[source] std::io::Error),
    #[error("Malformed configuration file '{}'.", .0.display())]
    MalformedFile(PathBuf, #[source] serde_yaml::Error),
    #[error("Missing value for 'backlog.{0}' in configuration file.")]
    MissingValue(&'static str),
}

/// Server settings, sourced from the environment and command line.
#[derive(Debug, Clone)]
pub struct Config {
    telemetry_url: Option<String>,
    webhook_secret: Option<String>,
    bind_ip: String,
    config_path: PathBuf,
    backlog_api_url: Option<String>,
    dispatch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let dispatch_timeout = match env_to_str("BR_DISPATCH_TIMEOUT") {
            Some(value) => parse_timeout(&value)?,
            None => Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        };

        Ok(Self {
            telemetry_url: env_to_str("BR_TELEMETRY_URL"),
            webhook_secret: env_to_str("BR_WEBHOOK_SECRET"),
            bind_ip: env_to_str("BR_BIND_IP").unwrap_or_else(|| "127.0.0.1:3000".into()),
            config_path: env_to_str("BR_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into())
                .into(),
            backlog_api_url: env_to_str("BR_BACKLOG_API_URL"),
            dispatch_timeout,
        })
    }

    pub fn empty() -> Self {
        Self {
            telemetry_url: None,
            webhook_secret: None,
            bind_ip: "".into(),
            config_path: DEFAULT_CONFIG_PATH.into(),
            backlog_api_url: None,
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }

    pub fn telemetry_url(&self) -> Option<&str> {
        self.telemetry_url.as_deref()
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }

    pub fn bind_ip(&self) -> &str {
        &self.bind_ip
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backlog_api_url(&self) -> Option<&str> {
        self.backlog_api_url.as_deref()
    }

    pub fn dispatch_timeout(&self) -> Duration {
        self.dispatch_timeout
    }

    pub fn set_telemetry_url<T: Into<String>>(&mut self, value: T) {
        self.telemetry_url = Some(value.into());
    }

    pub fn set_webhook_secret<T: Into<String>>(&mut self, value: T) {
        self.webhook_secret = Some(value.into());
    }

    pub fn set_bind_ip<T: Into<String>>(&mut self, value: T) {
        self.bind_ip = value.into();
    }

    pub fn set_config_path<T: Into<PathBuf>>(&mut self, value: T) {
        self.config_path = value.into();
    }

    pub fn set_backlog_api_url<T: Into<String>>(&mut self, value: T) {
        self.backlog_api_url = Some(value.into());
    }

    pub fn set_dispatch_timeout(&mut self, value: Duration) {
        self.dispatch_timeout = value;
    }

    pub fn validate_configuration(&self) -> Result<(), ConfigError> {
        let _ = SocketAddr::from_str(&self.bind_ip)
            .map_err(|_| ConfigError::MalformedBindIp(self.bind_ip.clone()))?;

        Ok(())
    }
}

fn env_to_str(env_key: &str) -> Option<String> {
    std::env::var(env_key).ok().filter(|s| !s.is_empty())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::MalformedDispatchTimeout(value.into())),
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    backlog: BacklogConfig,
}

/// Backlog tracker settings, read from the `backlog` section of the YAML
/// configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BacklogConfig {
    pub api_key: String,
    pub project_key: String,
    pub space_key: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_custom_field_id")]
    pub custom_field_id: u64,
    /// Only match `KEY-123`, never `KEY123`.
    #[serde(default)]
    pub require_hyphen_in_ticket_id: bool,
    /// Comment with every pushed commit (author fields) instead of the last
    /// one (committer fields).
    #[serde(default)]
    pub notify_on_all_commits: bool,
    #[serde(default = "default_true")]
    pub subscribe_pull_requests: bool,
}

fn default_domain() -> String {
    DEFAULT_BACKLOG_DOMAIN.into()
}

fn default_custom_field_id() -> u64 {
    DEFAULT_CUSTOM_FIELD_ID
}

fn default_true() -> bool {
    true
}

static BACKLOG_CONFIG: OnceCell<Option<Arc<BacklogConfig>>> = OnceCell::new();

impl BacklogConfig {
    pub fn new<T: Into<String>>(api_key: T, project_key: T, space_key: T) -> Self {
        Self {
            api_key: api_key.into(),
            project_key: project_key.into(),
            space_key: space_key.into(),
            domain: default_domain(),
            custom_field_id: DEFAULT_CUSTOM_FIELD_ID,
            require_hyphen_in_ticket_id: false,
            notify_on_all_commits: false,
            subscribe_pull_requests: true,
        }
    }

    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::MalformedFile(path.to_owned(), e))?;
        file.backlog.validate().map(|_| file.backlog)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::UnreadableFile(path.to_owned(), e))?;
        Self::from_yaml(path, &content)
    }

    /// Load the configuration at most once per process.
    ///
    /// The first caller reads the file; every later caller (whatever the
    /// path) observes the same result. A failed load is logged and cached as
    /// `None`.
    pub fn get_or_load(path: &Path) -> Option<Arc<Self>> {
        Self::get_or_load_in(&BACKLOG_CONFIG, path)
    }

    fn get_or_load_in(cell: &OnceCell<Option<Arc<Self>>>, path: &Path) -> Option<Arc<Self>> {
        cell.get_or_init(|| match Self::load(path) {
            Ok(config) => Some(Arc::new(config)),
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "could not load Backlog configuration");
                None
            }
        })
        .clone()
    }

    /// Root of the Backlog API, e.g. `https://myspace.backlog.jp`.
    pub fn api_url(&self) -> String {
        format!("https://{}.{}", self.space_key, self.domain)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("apiKey"));
        }
        if self.project_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("projectKey"));
        }
        if self.space_key.trim().is_empty() {
            return Err(ConfigError::MissingValue("spaceKey"));
        }

        Ok(())
    }
}
