use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::session_manager::{DEFAULT_ACCESS_TTL, DEFAULT_RENEW_INTERVAL, RenewalPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/";
pub const DEFAULT_DB_URL: &str = "sqlite://showcase.sqlite3";
pub const DEFAULT_LOGO_BASE: &str = "/media/logos/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Location of the remote showcase API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    request_timeout: Duration,
}

impl ApiConfig {
    /// Parse the API base URL. A trailing slash is added so relative endpoint
    /// paths resolve beneath it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_owned()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
            raw: base_url.to_owned(),
            source,
        })?;
        Ok(Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Resolve an endpoint path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

/// Everything the binary needs to assemble the showcase.
#[derive(Clone, Debug)]
pub struct ShowcaseConfig {
    pub api: ApiConfig,
    pub db_url: String,
    pub renewal: RenewalPolicy,
    pub logo_base: String,
}

impl ShowcaseConfig {
    /// Read configuration from `SHOWCASE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`ShowcaseConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let api_url = non_blank("SHOWCASE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api = ApiConfig::new(&api_url)?;
        let db_url = non_blank("SHOWCASE_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.into());
        let logo_base =
            non_blank("SHOWCASE_LOGO_BASE").unwrap_or_else(|| DEFAULT_LOGO_BASE.into());

        let interval = match non_blank("SHOWCASE_RENEW_INTERVAL_SECS") {
            Some(raw) => parse_seconds("SHOWCASE_RENEW_INTERVAL_SECS", &raw)?,
            None => DEFAULT_RENEW_INTERVAL,
        };
        let access_ttl = match non_blank("SHOWCASE_ACCESS_TTL_SECS") {
            Some(raw) => parse_seconds("SHOWCASE_ACCESS_TTL_SECS", &raw)?,
            None => DEFAULT_ACCESS_TTL,
        };

        Ok(Self {
            api,
            db_url,
            renewal: RenewalPolicy::new(interval, Some(access_ttl)),
            logo_base,
        })
    }
}

fn parse_seconds(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            raw: raw.to_owned(),
        }),
    }
}
