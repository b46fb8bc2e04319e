//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use tracing::warn;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ENDPOINT: &str = "/chat";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Floor for the request timeout: the server's default poll hold (10 s)
/// plus headroom, so an idle `getEvents` is never cut off client-side.
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Whole-request timeout. Must exceed the server's long-poll hold time.
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `CHAT_ENDPOINT`: default `/chat`
    /// - `CHAT_REQUEST_TIMEOUT_SECS`: default 60, raised to at least
    ///   [`MIN_REQUEST_TIMEOUT_SECS`]
    /// - `CHAT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL is not http(s).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base_url = lookup("CHAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let endpoint = lookup("CHAT_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let mut request_secs = parse_u64(&lookup, "CHAT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_secs < MIN_REQUEST_TIMEOUT_SECS {
            warn!(
                request_secs,
                min = MIN_REQUEST_TIMEOUT_SECS,
                "config: request timeout shorter than a long poll; raising it"
            );
            request_secs = MIN_REQUEST_TIMEOUT_SECS;
        }
        let timeouts = Timeouts {
            request_secs,
            connect_secs: parse_u64(&lookup, "CHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self { base_url: String::new(), endpoint, timeouts }.with_base_url(&base_url)
    }

    /// Replace the base URL, normalizing away a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
