//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, ObservabilityConfig, WeatherServiceConfig};
use crate::config::validation::{validate_gateway, validate_weather_service, ValidationError};

pub const ENV_LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
pub const ENV_SERVICE_B_URL: &str = "SERVICE_B_URL";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_VIACEP_BASE_URL: &str = "VIACEP_BASE_URL";
pub const ENV_WEATHER_API_BASE_URL: &str = "WEATHER_API_BASE_URL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_METRICS_ADDRESS: &str = "METRICS_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the gateway configuration from `path` (if any) and the process
/// environment.
pub fn load_gateway_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_gateway_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_gateway_config`] with an explicit environment lookup.
pub fn load_gateway_config_with<E>(path: Option<&Path>, env: E) -> Result<GatewayConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = read_file(path)?;
    let env = non_empty(env);

    if let Some(address) = env(ENV_LISTEN_ADDRESS) {
        config.listener.bind_address = address;
    }
    if let Some(url) = env(ENV_SERVICE_B_URL) {
        config.downstream.base_url = url;
    }
    apply_observability_env(&mut config.observability, &env)?;

    validate_gateway(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the weather service configuration from `path` (if any) and the
/// process environment. Fails when no API key is configured.
pub fn load_weather_service_config(path: Option<&Path>) -> Result<WeatherServiceConfig, ConfigError> {
    load_weather_service_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_weather_service_config`] with an explicit environment lookup.
pub fn load_weather_service_config_with<E>(
    path: Option<&Path>,
    env: E,
) -> Result<WeatherServiceConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config: WeatherServiceConfig = read_file(path)?;
    let env = non_empty(env);

    if let Some(address) = env(ENV_LISTEN_ADDRESS) {
        config.listener.bind_address = address;
    }
    if let Some(key) = env(ENV_WEATHER_API_KEY) {
        config.weather.api_key = key;
    }
    if let Some(url) = env(ENV_VIACEP_BASE_URL) {
        config.location.base_url = url;
    }
    if let Some(url) = env(ENV_WEATHER_API_BASE_URL) {
        config.weather.base_url = url;
    }
    apply_observability_env(&mut config.observability, &env)?;

    validate_weather_service(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file<T>(path: Option<&Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(T::default()),
    }
}

// Empty variables count as unset.
fn non_empty<E>(env: E) -> impl Fn(&str) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    move |key| env(key).filter(|v| !v.trim().is_empty())
}

fn apply_observability_env<E>(config: &mut ObservabilityConfig, env: &E) -> Result<(), ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(format) = env(ENV_LOG_FORMAT) {
        config.log_format = format.parse().map_err(|reason| ConfigError::Env {
            key: ENV_LOG_FORMAT,
            reason,
        })?;
    }
    if let Some(level) = env(ENV_LOG_LEVEL) {
        config.log_level = level;
    }
    if let Some(address) = env(ENV_METRICS_ADDRESS) {
        config.metrics_address = address;
        config.metrics_enabled = true;
    }
    Ok(())
}
