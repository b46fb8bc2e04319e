//! Request/response substrate.
//!
//! DESIGN
//! ======
//! [`Transport`] is the seam the runner talks to: one action in, one decoded
//! envelope out. [`HttpTransport`] is the production implementation; it
//! keeps a cookie store so the server's session cookie gives the client
//! its identity across requests.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::time::Duration;

use ajax::{Action, Response};
use reqwest::Url;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Sends one action and returns the decoded responses.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, action: &Action) -> Result<Vec<Response>, ClientError>;
}

/// `ajax-response` over HTTP with cookie-based session affinity.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the endpoint URL cannot be
    /// formed, or [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = endpoint_url(&config.base_url, &config.endpoint)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, action: &Action) -> Result<Vec<Response>, ClientError> {
        debug!(action = action.name(), "ajax: send");
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&action.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16() });
        }

        let body = response.text().await?;
        let responses = ajax::decode_envelope(&body)?;
        debug!(action = action.name(), count = responses.len(), "ajax: recv");
        Ok(responses)
    }
}

/// Resolve `endpoint` against `base_url`.
pub(crate) fn endpoint_url(base_url: &str, endpoint: &str) -> Result<Url, ClientError> {
    let base = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    base.join(endpoint)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}{endpoint}: {e}")))
}
