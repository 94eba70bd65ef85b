//! Structured logging and the span pipeline.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber
//! - Bridge `tracing` spans into OpenTelemetry spans
//! - Flush the tracer provider on shutdown
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - JSON format for production, pretty format for development
//! - No exporter is attached here; span export is deployment wiring

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::observability::trace_context::Propagation;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Handle to the installed tracing pipeline.
pub struct Telemetry {
    provider: SdkTracerProvider,
    propagation: Propagation,
}

impl Telemetry {
    pub fn propagation(&self) -> Propagation {
        self.propagation.clone()
    }

    /// Flush and close the tracer provider.
    pub fn shutdown(self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
}

/// Tracer provider tagging every span with `service.name`.
pub fn tracer_provider(service_name: &str) -> SdkTracerProvider {
    let resource = Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name.to_string())])
        .build();

    SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
        .with_resource(resource)
        .build()
}

/// Install the global subscriber. Call once per process.
pub fn init(config: &ObservabilityConfig) -> Result<Telemetry, TelemetryError> {
    let provider = tracer_provider(&config.service_name);
    let tracer = provider.tracer(config.service_name.clone());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level)));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_opentelemetry::layer().with_tracer(tracer));

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(Telemetry {
        provider,
        propagation: Propagation::new(),
    })
}
