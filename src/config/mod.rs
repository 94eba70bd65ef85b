//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize, then environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig / WeatherServiceConfig (validated, immutable)
//!     → handed to the service at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults so an empty file (or none) is valid
//! - Environment wins over the file, matching container deployments
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_gateway_config, load_weather_service_config, ConfigError};
pub use schema::{
    DownstreamConfig, GatewayConfig, ListenerConfig, LocationApiConfig, LogFormat,
    ObservabilityConfig, TimeoutConfig, WeatherApiConfig, WeatherServiceConfig,
};
