// ABOUTME: Client configuration for the management API
// ABOUTME: Loads base URL, authtoken and timeouts from the environment or builder calls

use std::env;
use std::time::Duration;

use url::Url;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
    STACK_MANAGEMENT_API_URL, STACK_MANAGEMENT_AUTHTOKEN, STACK_MANAGEMENT_CONNECT_TIMEOUT_SECS,
    STACK_MANAGEMENT_TIMEOUT_SECS, STACK_MANAGEMENT_USER_AGENT,
};
use crate::error::{ManagementError, ManagementResult};

/// Connection settings shared by every stack created from one client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    auth_token: Option<String>,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given API base URL.
    ///
    /// The URL must be absolute http(s); a trailing slash is dropped so that
    /// request paths can be appended verbatim.
    pub fn new(base_url: &str) -> ManagementResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            auth_token: None,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from `STACK_MANAGEMENT_*` environment variables.
    /// Unset variables fall back to defaults.
    pub fn from_env() -> ManagementResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ManagementResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(STACK_MANAGEMENT_API_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut config = Self::new(&base_url)?;

        if let Some(token) = lookup(STACK_MANAGEMENT_AUTHTOKEN).filter(|v| !v.is_empty()) {
            config.auth_token = Some(token);
        }
        if let Some(agent) = lookup(STACK_MANAGEMENT_USER_AGENT).filter(|v| !v.is_empty()) {
            config.user_agent = agent;
        }
        if let Some(secs) = lookup(STACK_MANAGEMENT_TIMEOUT_SECS) {
            config.timeout = parse_secs(STACK_MANAGEMENT_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(STACK_MANAGEMENT_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout = parse_secs(STACK_MANAGEMENT_CONNECT_TIMEOUT_SECS, &secs)?;
        }

        Ok(config)
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

fn default_user_agent() -> String {
    format!("stack-management-rust/{}", env!("CARGO_PKG_VERSION"))
}

fn normalize_base_url(raw: &str) -> ManagementResult<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ManagementError::config(format!("Invalid API URL '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ManagementError::config(format!(
                "Unsupported API URL scheme '{}'",
                other
            )))
        }
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn parse_secs(key: &str, value: &str) -> ManagementResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ManagementError::config(format!("{} must be a number of seconds, got '{}'", key, value)))
}
