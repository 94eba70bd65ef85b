//! W3C Trace Context propagation over HTTP headers.
//!
//! # Responsibilities
//! - Continue the caller's trace from an inbound `traceparent` header
//! - Inject the current span's context into outbound requests
//!
//! # Design Decisions
//! - Owns its propagator instead of reading `opentelemetry::global`
//! - Missing or malformed headers start a fresh trace, never an error

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C Trace Context header name.
pub const TRACEPARENT: &str = "traceparent";

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// Trace context propagation shared by handlers and upstream clients.
#[derive(Debug, Clone, Default)]
pub struct Propagation {
    propagator: Arc<TraceContextPropagator>,
}

impl Propagation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `span`'s context into `headers`.
    ///
    /// Without an OpenTelemetry layer installed the span has no valid
    /// context and nothing is written.
    pub fn inject(&self, span: &Span, headers: &mut HeaderMap) {
        let cx = span.context();
        self.propagator
            .inject_context(&cx, &mut HeaderInjector(headers));
    }

    /// Make the trace found in `headers` the parent of `span`.
    ///
    /// Must run before the span is entered.
    pub fn set_parent(&self, span: &Span, headers: &HeaderMap) {
        let parent = self.propagator.extract(&HeaderExtractor(headers));
        if let Err(e) = span.set_parent(parent) {
            tracing::debug!(error = ?e, "Inbound trace context not applied");
        }

        if let Some(trace_id) = incoming_trace_id(headers) {
            span.record("trace_id", trace_id);
        }
    }
}

/// Trace ID carried by an inbound `traceparent` header, if well formed.
pub fn incoming_trace_id(headers: &HeaderMap) -> Option<&str> {
    let traceparent = headers.get(TRACEPARENT)?.to_str().ok()?;
    parse_trace_id(traceparent)
}

/// Trace ID from `00-{trace_id}-{span_id}-{flags}`.
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let span_id = parts.next()?;
    let flags = parts.next()?;

    let well_formed = version == "00"
        && trace_id.len() == 32
        && span_id.len() == 16
        && flags.len() == 2
        && parts.next().is_none();
    well_formed.then_some(trace_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_parse_trace_id_ok() {
        assert_eq!(
            parse_trace_id(SAMPLE),
            Some("4bf92f3577b34da6a3ce929d0e0e4736")
        );
    }

    #[test]
    fn test_parse_trace_id_invalid() {
        assert!(parse_trace_id("").is_none());
        assert!(parse_trace_id("invalid").is_none());
        assert!(parse_trace_id("01-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01").is_none());
        assert!(parse_trace_id("00-4bf92f35-00f067aa0ba902b7-01").is_none());
    }

    #[test]
    fn test_incoming_trace_id_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(incoming_trace_id(&headers).is_none());

        headers.insert(TRACEPARENT, SAMPLE.parse().unwrap());
        assert_eq!(
            incoming_trace_id(&headers),
            Some("4bf92f3577b34da6a3ce929d0e0e4736")
        );
    }

    #[test]
    fn test_inject_without_otel_layer_is_noop() {
        let propagation = Propagation::new();
        let mut headers = HeaderMap::new();
        let span = tracing::info_span!("outbound");

        propagation.inject(&span, &mut headers);
        assert!(headers.get(TRACEPARENT).is_none());
    }

    #[test]
    fn test_set_parent_without_otel_layer_does_not_panic() {
        let propagation = Propagation::new();
        let mut headers = HeaderMap::new();
        headers.insert(TRACEPARENT, SAMPLE.parse().unwrap());
        let span = tracing::info_span!("inbound", trace_id = tracing::field::Empty);

        propagation.set_parent(&span, &headers);
    }

    fn with_otel<T>(f: impl FnOnce() -> T) -> T {
        use opentelemetry::trace::TracerProvider as _;
        use tracing_subscriber::layer::SubscriberExt;

        let provider = crate::observability::logging::tracer_provider("trace-context-test");
        let subscriber = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("trace-context-test")));
        tracing::subscriber::with_default(subscriber, f)
    }

    #[test]
    fn test_set_parent_continues_inbound_trace() {
        with_otel(|| {
            let propagation = Propagation::new();
            let mut inbound = HeaderMap::new();
            inbound.insert(TRACEPARENT, SAMPLE.parse().unwrap());
            let span = tracing::info_span!("inbound", trace_id = tracing::field::Empty);

            propagation.set_parent(&span, &inbound);

            let mut outbound = HeaderMap::new();
            propagation.inject(&span, &mut outbound);
            let traceparent = outbound.get(TRACEPARENT).unwrap().to_str().unwrap();
            assert_eq!(parse_trace_id(traceparent), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
            assert!(!traceparent.contains("00f067aa0ba902b7"));
        });
    }

    #[test]
    fn test_set_parent_on_entered_span_keeps_span_usable() {
        with_otel(|| {
            let propagation = Propagation::new();
            let mut inbound = HeaderMap::new();
            inbound.insert(TRACEPARENT, SAMPLE.parse().unwrap());
            let span = tracing::info_span!("inbound", trace_id = tracing::field::Empty);
            let _entered = span.enter();

            propagation.set_parent(&span, &inbound);

            let mut outbound = HeaderMap::new();
            propagation.inject(&span, &mut outbound);
            let traceparent = outbound.get(TRACEPARENT).unwrap().to_str().unwrap();
            assert!(parse_trace_id(traceparent).is_some());
        });
    }
}
