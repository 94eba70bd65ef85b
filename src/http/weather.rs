//! Weather service handler: CEP → locality → temperature → report.
//!
//! ```text
//! Received → Validated → LocationResolved → WeatherResolved → Responded
//!               │               │                  │
//!               └── 422 ────────┴── 404 / 500 ─────┴── 500 ──→ Responded
//! ```
//!
//! The two lookups run one after the other: the weather lookup needs the
//! locality found by the first.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::Span;

use crate::domain::{PostalCode, TemperatureReport};
use crate::http::response::ServiceError;
use crate::http::server::WeatherState;

/// `GET /weather/{cep}`.
pub async fn weather_by_cep(
    State(state): State<WeatherState>,
    uri: Uri,
    cep: Result<Path<String>, PathRejection>,
) -> Response {
    // A segment that does not decode to UTF-8 is just another invalid code.
    let cep = match cep {
        Ok(Path(cep)) => cep,
        Err(_) => uri.path().trim_start_matches("/weather/").to_string(),
    };
    respond(build_report(&state, &cep).await)
}

/// `GET /weather/` with no code at all.
pub async fn weather_without_cep(State(state): State<WeatherState>) -> Response {
    respond(build_report(&state, "").await)
}

fn respond(result: Result<TemperatureReport, ServiceError>) -> Response {
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run the pipeline for one raw code. The first failure ends it.
#[tracing::instrument(
    name = "weather_orchestration",
    skip_all,
    fields(
        cep.input = %cep,
        city.name = tracing::field::Empty,
        temperature.celsius = tracing::field::Empty,
        otel.status_code = tracing::field::Empty,
    )
)]
pub async fn build_report(state: &WeatherState, cep: &str) -> Result<TemperatureReport, ServiceError> {
    let span = Span::current();
    let result = run_pipeline(state, cep, &span).await;
    if let Err(e) = &result {
        e.record_on(&span);
    }
    result
}

async fn run_pipeline(
    state: &WeatherState,
    cep: &str,
    span: &Span,
) -> Result<TemperatureReport, ServiceError> {
    let code = PostalCode::parse(cep)?;

    let location = state.location.resolve(&code).await?;
    span.record("city.name", location.locality.as_str());

    let sample = state.weather.resolve(&location.locality).await?;
    span.record("temperature.celsius", sample.celsius);

    Ok(TemperatureReport::new(location.locality, sample))
}
