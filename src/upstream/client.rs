//! Shared HTTP client plumbing for upstream calls.

use std::time::{Duration, Instant};

use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use tracing::Span;

use crate::observability::{metrics, Propagation};
use crate::upstream::error::UpstreamError;

const USER_AGENT: &str = concat!("cep-weather/", env!("CARGO_PKG_VERSION"));

/// Build a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// One JSON GET against an external dependency.
#[derive(Debug, Clone)]
pub struct JsonCall {
    client: Client,
    service: &'static str,
    timeout: Duration,
    propagation: Propagation,
}

impl JsonCall {
    pub fn new(
        service: &'static str,
        timeout: Duration,
        propagation: Propagation,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            service,
            timeout,
            propagation,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn error(&self, error: reqwest::Error) -> UpstreamError {
        UpstreamError::from_reqwest(self.service, self.timeout.as_secs(), error)
    }

    /// Send `request` with the current trace context and decode the body.
    ///
    /// Transport and timeout failures come first, then non-success
    /// status, then decoding.
    pub async fn execute<T>(&self, request: Result<Request, reqwest::Error>) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let result = self.send(request).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::record_upstream(self.service, outcome, start);
        result
    }

    async fn send<T>(&self, request: Result<Request, reqwest::Error>) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let mut request = request.map_err(|e| self.error(e))?;
        self.propagation
            .inject(&Span::current(), request.headers_mut());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.error(e))?;

        let status = response.status();
        tracing::debug!(service = self.service, status = status.as_u16(), "Upstream responded");
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: self.service,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.error(e))?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Decode {
            service: self.service,
            source,
        })
    }
}
