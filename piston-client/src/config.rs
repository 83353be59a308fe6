use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// Public Piston instance hosted by the Engineer Man community.
pub const DEFAULT_API_URL: &str = "https://emkc.org/api/v2/piston/execute";

/// Environment variable that overrides the execution endpoint
pub const API_URL_ENV: &str = "PISTON_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the execute endpoint
    pub api_url: String,

    /// Optional transport timeout. `None` leaves the request unbounded.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }

    /// Build a configuration from the process environment, keeping the
    /// defaults for anything that is not set.
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new().with_api_url(url),
            _ => Self::new(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::Configuration("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
