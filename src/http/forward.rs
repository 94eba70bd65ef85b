//! Gateway handler: validate the CEP and relay the weather service's answer.
//!
//! Once a CEP passes validation the gateway is a content-agnostic relay:
//! status, `Content-Type` and body of the downstream response are copied
//! as they are.

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::Span;

use crate::domain::PostalCode;
use crate::http::request::X_REQUEST_ID;
use crate::http::response::ServiceError;
use crate::http::server::GatewayState;

/// Largest downstream body the gateway relays.
const MAX_RELAY_BODY: usize = 1024 * 1024;

/// Gateway request body. A missing `cep` is an empty code.
#[derive(Debug, Default, Deserialize)]
pub struct CepInput {
    #[serde(default)]
    pub cep: String,
}

/// `POST /`.
#[tracing::instrument(
    name = "handle_cep_request",
    skip_all,
    fields(cep = tracing::field::Empty, otel.status_code = tracing::field::Empty)
)]
pub async fn forward_cep(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match handle(&state, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            e.record_on(&Span::current());
            e.into_response()
        }
    }
}

/// Any other method on `/`. The body is never read.
pub async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}

async fn handle(
    state: &GatewayState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ServiceError> {
    let body = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let input: CepInput =
        serde_json::from_slice(&body).map_err(|e| ServiceError::BadRequest(e.to_string()))?;

    Span::current().record("cep", input.cep.as_str());
    let code = PostalCode::parse(&input.cep)?;

    forward(state, &code, headers.get(X_REQUEST_ID)).await
}

#[tracing::instrument(
    name = "forward_to_weather_service",
    skip_all,
    fields(
        cep = %code,
        downstream.url = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        otel.status_code = tracing::field::Empty,
    )
)]
async fn forward(
    state: &GatewayState,
    code: &PostalCode,
    request_id: Option<&HeaderValue>,
) -> Result<Response, ServiceError> {
    let url = format!("{}/weather/{}", state.downstream_base, code);
    let span = Span::current();
    span.record("downstream.url", url.as_str());

    let mut builder = Request::builder().method(Method::GET).uri(url);
    if let Some(id) = request_id {
        builder = builder.header(X_REQUEST_ID, id.clone());
    }
    let mut request = builder
        .body(Body::empty())
        .map_err(|e| ServiceError::Downstream(format!("failed to build request: {}", e)))
        .inspect_err(|e| e.record_on(&span))?;
    state.propagation.inject(&span, request.headers_mut());

    let exchange = async {
        let response = state
            .client
            .request(request)
            .await
            .map_err(|e| ServiceError::Downstream(e.to_string()))?;
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(body), MAX_RELAY_BODY)
            .await
            .map_err(|e| ServiceError::Downstream(format!("failed to read body: {}", e)))?;
        Ok::<_, ServiceError>((parts.status, parts.headers.get(header::CONTENT_TYPE).cloned(), bytes))
    };

    let (status, content_type, bytes) = tokio::time::timeout(state.downstream_timeout, exchange)
        .await
        .map_err(|_| {
            ServiceError::Downstream(format!(
                "timed out after {}s",
                state.downstream_timeout.as_secs()
            ))
        })
        .and_then(|result| result)
        .inspect_err(|e| e.record_on(&span))?;

    span.record("http.status_code", status.as_u16());
    relay(status, content_type, bytes)
}

fn relay(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(body))
        .map_err(|e| ServiceError::Downstream(e.to_string()))
}
