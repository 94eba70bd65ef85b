//! Locality → current temperature lookup (WeatherAPI).

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::WeatherApiConfig;
use crate::domain::WeatherSample;
use crate::observability::{record_failure, Propagation};
use crate::upstream::client::JsonCall;
use crate::upstream::error::UpstreamError;

/// Dependency name used in messages and metrics.
pub const SERVICE: &str = "weather API";

/// Resolves a locality name to its current temperature.
#[async_trait]
pub trait WeatherResolver: Send + Sync {
    async fn resolve(&self, locality: &str) -> Result<WeatherSample, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}

/// HTTP client for a WeatherAPI-compatible `current.json` endpoint.
#[derive(Clone)]
pub struct WeatherApiClient {
    call: JsonCall,
    url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(config: &WeatherApiConfig, propagation: Propagation) -> Result<Self, reqwest::Error> {
        Ok(Self {
            call: JsonCall::new(SERVICE, config.timeout(), propagation)?,
            url: format!("{}/current.json", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    // `query` form-encodes the locality ("São Paulo" → "S%C3%A3o+Paulo").
    fn request(&self, locality: &str) -> Result<reqwest::Request, reqwest::Error> {
        self.call
            .client()
            .get(&self.url)
            .query(&[("key", self.api_key.as_str()), ("q", locality), ("aqi", "no")])
            .build()
    }
}

#[async_trait]
impl WeatherResolver for WeatherApiClient {
    #[tracing::instrument(
        name = "resolve_weather",
        skip_all,
        fields(city.name = %locality, temperature.celsius = tracing::field::Empty, otel.status_code = tracing::field::Empty)
    )]
    async fn resolve(&self, locality: &str) -> Result<WeatherSample, UpstreamError> {
        let request = self.request(locality);
        let payload: CurrentWeatherPayload = self
            .call
            .execute(request)
            .await
            .inspect_err(|e| record_failure(&tracing::Span::current(), e))?;

        let sample = WeatherSample {
            celsius: payload.current.temp_c,
        };
        tracing::Span::current().record("temperature.celsius", sample.celsius);
        Ok(sample)
    }
}
