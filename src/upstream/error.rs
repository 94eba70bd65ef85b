//! Upstream error types.

use thiserror::Error;

/// A failed call to an external dependency.
///
/// Messages name the dependency and end up in 500 response bodies, so
/// they never include request URLs (the weather URL carries the API key).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or body transfer failure.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The per-call deadline expired.
    #[error("{service} request timed out after {timeout_secs}s")]
    Timeout {
        service: &'static str,
        timeout_secs: u64,
    },

    /// The dependency answered with a non-success status.
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    /// The payload did not have the expected shape.
    #[error("{service} returned an unreadable payload: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// Classify a reqwest failure, dropping the URL from it.
    pub fn from_reqwest(service: &'static str, timeout_secs: u64, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                service,
                timeout_secs,
            }
        } else {
            Self::Transport {
                service,
                source: error.without_url(),
            }
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "bad_status",
            Self::Decode { .. } => "decode_error",
        }
    }
}

/// Failure of a postal code lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The lookup service does not know the code.
    #[error("can not find zipcode")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
