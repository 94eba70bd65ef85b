//! Request-level errors and their HTTP responses.
//!
//! # Design Decisions
//! - Every error is terminal for the request; nothing is partially written
//! - Error bodies are plain text, never JSON
//! - The gateway's own transport failures get a generic body; the cause is
//!   only logged

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::Span;

use crate::domain::InvalidPostalCode;
use crate::observability::record_failure;
use crate::upstream::{LookupError, UpstreamError};

/// Error body of a failed call from the gateway to the weather service.
pub const DOWNSTREAM_FAILURE_BODY: &str = "failed to call weather service";

/// Everything that can end a request early.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The CEP is not 8 ASCII digits (422).
    #[error("invalid zipcode")]
    InvalidZipcode,

    /// The lookup service does not know the CEP (404).
    #[error("can not find zipcode")]
    ZipcodeNotFound,

    /// An external dependency failed (500).
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Wrong HTTP method (405).
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Unreadable or unparseable request body (400).
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// The gateway could not build, send or read the downstream call (500).
    #[error("weather service call failed: {0}")]
    Downstream(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ZipcodeNotFound => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Plain-text body sent to the client.
    pub fn body(&self) -> String {
        match self {
            Self::BadRequest(_) => "invalid request body".to_string(),
            Self::Downstream(_) => DOWNSTREAM_FAILURE_BODY.to_string(),
            other => other.to_string(),
        }
    }

    /// Record this error on `span`: server errors mark the span failed,
    /// client errors are informational.
    pub fn record_on(&self, span: &Span) {
        if self.status().is_server_error() {
            record_failure(span, self);
        } else {
            tracing::info!(status = self.status().as_u16(), reason = %self, "Request rejected");
        }
    }
}

impl From<InvalidPostalCode> for ServiceError {
    fn from(_: InvalidPostalCode) -> Self {
        Self::InvalidZipcode
    }
}

impl From<LookupError> for ServiceError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NotFound => Self::ZipcodeNotFound,
            LookupError::Upstream(e) => Self::Upstream(e),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::MethodNotAllowed => (
                self.status(),
                [(header::ALLOW, "POST")],
                self.body(),
            )
                .into_response(),
            _ => (self.status(), self.body()).into_response(),
        }
    }
}
