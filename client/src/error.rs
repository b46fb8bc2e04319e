//! Client error type.

use ajax::AjaxError;

/// Errors produced by client transport and configuration.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("server returned status {status}")]
    Status { status: u16 },

    /// The response body was not a valid `ajax-response` envelope.
    #[error("invalid response: {0}")]
    Decode(#[from] AjaxError),

    /// The configured base URL or endpoint could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
