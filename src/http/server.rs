//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router of each service with its handlers
//! - Wire up middleware (request span, request ID, timeout, metrics)
//! - Continue the caller's trace on every inbound request
//! - Serve until the shutdown signal, letting in-flight requests finish

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    routing::{get, post},
    Router,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Span;

use crate::config::{GatewayConfig, WeatherServiceConfig};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::{forward, weather};
use crate::observability::{metrics, Propagation};
use crate::upstream::{LocationResolver, ViaCepClient, WeatherApiClient, WeatherResolver};

pub const GATEWAY: &str = "gateway";
pub const WEATHER_SERVICE: &str = "weather-service";

/// State injected into the gateway handler.
#[derive(Clone)]
pub struct GatewayState {
    pub client: Client<HttpsConnector<HttpConnector>, Body>,
    pub downstream_base: Arc<str>,
    pub downstream_timeout: Duration,
    pub propagation: Propagation,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig, propagation: Propagation) -> Result<Self, rustls::Error> {
        let client = Client::builder(TokioExecutor::new()).build(https_or_http_connector()?);

        Ok(Self {
            client,
            downstream_base: Arc::from(config.downstream.base_url.trim_end_matches('/')),
            downstream_timeout: config.downstream.timeout(),
            propagation,
        })
    }
}

/// Connector for `http://` and `https://` downstreams, trusting the
/// webpki root set.
fn https_or_http_connector() -> Result<HttpsConnector<HttpConnector>, rustls::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Ok(HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)?
        .https_or_http()
        .enable_all_versions()
        .build())
}

/// State injected into the weather handler.
#[derive(Clone)]
pub struct WeatherState {
    pub location: Arc<dyn LocationResolver>,
    pub weather: Arc<dyn WeatherResolver>,
}

impl WeatherState {
    pub fn new(location: Arc<dyn LocationResolver>, weather: Arc<dyn WeatherResolver>) -> Self {
        Self { location, weather }
    }

    /// State backed by the real HTTP clients.
    pub fn from_config(
        config: &WeatherServiceConfig,
        propagation: Propagation,
    ) -> Result<Self, reqwest::Error> {
        let location = ViaCepClient::new(&config.location, propagation.clone())?;
        let weather = WeatherApiClient::new(&config.weather, propagation)?;
        Ok(Self::new(Arc::new(location), Arc::new(weather)))
    }
}

/// HTTP server for one of the two services.
pub struct HttpServer {
    router: Router,
    service: &'static str,
}

impl HttpServer {
    /// Gateway: `POST /` validates and forwards to the weather service.
    pub fn gateway(config: &GatewayConfig, propagation: Propagation) -> Result<Self, rustls::Error> {
        let state = GatewayState::new(config, propagation.clone())?;
        let router = Router::new()
            .route(
                "/",
                post(forward::forward_cep).fallback(forward::method_not_allowed),
            )
            .with_state(state);

        Ok(Self {
            router: with_layers(router, GATEWAY, config.timeouts.request(), propagation),
            service: GATEWAY,
        })
    }

    /// Weather service: `GET /weather/{cep}` resolves city and temperature.
    pub fn weather_service(
        config: &WeatherServiceConfig,
        propagation: Propagation,
    ) -> Result<Self, reqwest::Error> {
        let state = WeatherState::from_config(config, propagation.clone())?;
        Ok(Self::weather_service_with(state, config.timeouts.request(), propagation))
    }

    /// Weather service over caller-provided resolvers.
    pub fn weather_service_with(
        state: WeatherState,
        request_timeout: Duration,
        propagation: Propagation,
    ) -> Self {
        let router = Router::new()
            .route("/weather/", get(weather::weather_without_cep))
            .route("/weather/{*cep}", get(weather::weather_by_cep))
            .with_state(state);

        Self {
            router: with_layers(router, WEATHER_SERVICE, request_timeout, propagation),
            service: WEATHER_SERVICE,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            service = self.service,
            address = %addr,
            "HTTP server starting"
        );

        let service = self.service;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!(service, "Shutdown signal received, draining");
            })
            .await?;

        tracing::info!(service, "HTTP server stopped");
        Ok(())
    }
}

/// Middleware shared by both services.
#[allow(deprecated)]
fn with_layers(
    router: Router,
    service: &'static str,
    request_timeout: Duration,
    propagation: Propagation,
) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<Body>| {
            let span = tracing::info_span!(
                "http_request",
                service,
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request),
                trace_id = tracing::field::Empty,
            );
            propagation.set_parent(&span, request.headers());
            span
        })
        .on_response(
            move |response: &Response<Body>, latency: Duration, _span: &Span| {
                let status = response.status().as_u16();
                tracing::info!(
                    status,
                    latency_ms = latency.as_millis() as u64,
                    "Request completed"
                );
                metrics::record_request(service, status, latency);
            },
        );

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(trace)
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}
