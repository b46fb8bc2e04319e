//! Server configuration from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// How long a `getEvents` request may wait for an event.
    pub poll_timeout: Duration,
    /// Members not seen for this long are evicted.
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; unset or malformed values fall
    /// back to defaults.
    ///
    /// The idle timeout must outlast a parked poll, otherwise a member who is
    /// waiting on `getEvents` gets evicted. A shorter one is raised to twice
    /// the poll timeout.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str, default: u64| env_parse(lookup(key), default);
        Self {
            port: env_parse(lookup("PORT"), DEFAULT_PORT),
            poll_timeout: Duration::from_millis(parse("CHAT_POLL_TIMEOUT_MS", DEFAULT_POLL_TIMEOUT_MS)),
            idle_timeout: Duration::from_secs(parse("CHAT_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)),
            sweep_interval: Duration::from_secs(parse("CHAT_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS).max(1)),
        }
        .clamp_idle_timeout()
    }

    fn clamp_idle_timeout(mut self) -> Self {
        if self.idle_timeout <= self.poll_timeout {
            let raised = self.poll_timeout.saturating_mul(2);
            warn!(
                idle_timeout = ?self.idle_timeout,
                poll_timeout = ?self.poll_timeout,
                raised_to = ?raised,
                "config: idle timeout does not outlast a poll; raising it"
            );
            self.idle_timeout = raised;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn env_parse<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}
