//! Client configuration.
//!
//! Built explicitly with `ClientConfig::new` and the `with_*` methods, or read
//! from `OFFICEVIBE_API_KEY`, `OFFICEVIBE_BASE_URL` and
//! `OFFICEVIBE_TIMEOUT_SECS` with `ClientConfig::from_env`.

use std::fmt;
use std::time::Duration;

use crate::error::VibeError;

/// Production endpoint of the OfficeVibe v2 API.
pub const DEFAULT_BASE_URL: &str = "https://app.officevibe.com/api/v2";

pub const API_KEY_ENV: &str = "OFFICEVIBE_API_KEY";
pub const BASE_URL_ENV: &str = "OFFICEVIBE_BASE_URL";
pub const TIMEOUT_ENV: &str = "OFFICEVIBE_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Points the client at another server, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bounds every call end to end; an expired deadline aborts the request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn from_env() -> Result<Self, VibeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, VibeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| VibeError::ConfigError(format!("{API_KEY_ENV} is not set")))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    VibeError::ConfigError(format!(
                        "{TIMEOUT_ENV} must be a positive number of seconds, got {raw:?}"
                    ))
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
