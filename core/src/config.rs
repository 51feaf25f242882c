//! Client configuration.
//!
//! Defaults target the production API. Every setting can be overridden in
//! code or, through [`ClientConfig::from_env`], with `ASC_BASE_URL` and
//! `ASC_TIMEOUT_SECS`.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest token lifetime the API accepts.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(20 * 60);

const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to the whole round trip of each request. No retries.
    pub timeout: Duration,
    pub token_lifetime: Duration,
    /// A cached token expiring within this margin is replaced before use.
    pub token_refresh_margin: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_lifetime: MAX_TOKEN_LIFETIME,
            token_refresh_margin: DEFAULT_REFRESH_MARGIN,
            user_agent: concat!("appstore-connect-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().base_url(base_url)
    }

    /// Defaults overridden by `ASC_BASE_URL` and `ASC_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("ASC_BASE_URL") {
            config = config.base_url(&base_url);
        }
        if let Ok(raw) = std::env::var("ASC_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
                name: "ASC_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn token_refresh_margin(mut self, margin: Duration) -> Self {
        self.token_refresh_margin = margin;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if self.token_lifetime.is_zero() || self.token_lifetime > MAX_TOKEN_LIFETIME {
            return Err(ConfigError::InvalidValue {
                name: "token_lifetime",
                reason: format!(
                    "{}s is outside 1..={}s",
                    self.token_lifetime.as_secs(),
                    MAX_TOKEN_LIFETIME.as_secs()
                ),
            });
        }
        if self.token_refresh_margin >= self.token_lifetime {
            return Err(ConfigError::InvalidValue {
                name: "token_refresh_margin",
                reason: "must be shorter than the token lifetime".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "timeout",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.base_url)?)
    }
}
