//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the gateway (validates CEPs and forwards them).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Where validated requests are forwarded.
    pub downstream: DownstreamConfig,

    /// Whole-request deadline.
    pub timeouts: TimeoutConfig,

    /// Logging, tracing and metrics.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
            },
            downstream: DownstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::named("cep-gateway"),
        }
    }
}

/// Configuration of the weather service (CEP → city → temperature).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherServiceConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Postal code lookup API.
    pub location: LocationApiConfig,

    /// Current weather API.
    pub weather: WeatherApiConfig,

    /// Whole-request deadline.
    pub timeouts: TimeoutConfig,

    /// Logging, tracing and metrics.
    pub observability: ObservabilityConfig,
}

impl Default for WeatherServiceConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig {
                bind_address: "0.0.0.0:8081".to_string(),
            },
            location: LocationApiConfig::default(),
            weather: WeatherApiConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::named("cep-weather-service"),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Downstream weather service as seen from the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Base URL; `/weather/{cep}` is appended. Plain `http` only.
    pub base_url: String,

    /// Deadline for the whole downstream exchange. Must exceed the
    /// weather service's own upstream deadlines.
    pub timeout_secs: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://service-b:8081".to_string(),
            timeout_secs: 10,
        }
    }
}

impl DownstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// ViaCEP-compatible lookup API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationApiConfig {
    /// Base URL; `/{cep}/json/` is appended.
    pub base_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LocationApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://viacep.com.br/ws".to_string(),
            timeout_secs: 5,
        }
    }
}

impl LocationApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// WeatherAPI-compatible current conditions API.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    /// Base URL; `/current.json` is appended.
    pub base_url: String,

    /// API key sent as the `key` query parameter. Required.
    pub api_key: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherapi.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 5,
        }
    }
}

impl WeatherApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for WeatherApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Overall request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 15 }
    }
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `service.name` resource attribute on every span.
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl ObservabilityConfig {
    fn named(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            ..Self::default()
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "cep-weather".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
