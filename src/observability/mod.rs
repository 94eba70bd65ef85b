//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → trace_context.rs (parent span from `traceparent`)
//!     → handler / resolver spans (tracing + OpenTelemetry layer)
//!     → trace_context.rs (inject `traceparent` into every outbound call)
//!
//! All subsystems produce:
//!     → logging.rs (structured log events, tracer provider)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Propagator is an owned value handed to each service, not a global
//! - Span attributes are diagnostic only; nothing reads them back
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod trace_context;

pub use logging::{Telemetry, TelemetryError};
pub use trace_context::{Propagation, TRACEPARENT};

use tracing::Span;

/// Mark `span` as failed and log the cause.
pub fn record_failure(span: &Span, error: &dyn std::error::Error) {
    span.record("otel.status_code", "ERROR");
    tracing::error!(error = %error, "Request failed");
}
