//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx HTTP response.
    #[error("server responded with HTTP {status}")]
    BadStatus { status: u16 },

    /// The operation returned its error variant.
    #[error("rejected: {}", codes.join(", "))]
    Rejected { codes: Vec<String> },

    /// Top-level GraphQL error (malformed query, internal failure).
    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the server refused the caller's API key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { codes } if codes.iter().any(|c| c == "UNAUTHORIZED"))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
