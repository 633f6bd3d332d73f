///! Error taxonomy of a single fetch attempt
use serde::Serialize;
use thiserror::Error;

/// Why a fetch attempt did not produce a usable value.
///
/// Carried by `ResourceResult::Fallback` and `ResourceResult::Failure` as
/// the terminal reason, so it is cheap to clone and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response at all (DNS, connect, reset ...)
    #[error("network error: {message}")]
    Network { message: String },

    /// Response with a non-2xx status
    #[error("HTTP error {status}")]
    Http { status: u16 },

    /// Deadline exceeded before a full response arrived
    #[error("request timed out")]
    Timeout,

    /// Body is not JSON, or JSON of the wrong shape
    #[error("parse error: {message}")]
    Parse { message: String },
}

impl ErrorKind {
    pub fn network(message: impl Into<String>) -> Self {
        ErrorKind::Network { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        ErrorKind::Parse { message: message.into() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorKind::Timeout)
    }
}

impl From<reqwest::Error> for ErrorKind {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ErrorKind::Timeout
        } else if let Some(status) = e.status() {
            ErrorKind::Http { status: status.as_u16() }
        } else if e.is_decode() {
            ErrorKind::parse(e.to_string())
        } else {
            ErrorKind::network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(e: serde_json::Error) -> Self {
        ErrorKind::parse(e.to_string())
    }
}
