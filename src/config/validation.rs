//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs
//! - Validate value ranges (timeouts > 0)
//! - Refuse a weather service without an API key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the config

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{
    GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig, WeatherServiceConfig,
};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("invalid {field} '{value}': {reason}")]
    Url {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must use the http or https scheme, got '{value}'")]
    Scheme { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("weather API key is not set (WEATHER_API_KEY)")]
    MissingApiKey,
}

pub fn validate_gateway(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener(&config.listener, &mut errors);
    check_timeouts(&config.timeouts, &mut errors);
    check_observability(&config.observability, &mut errors);

    if let Some(url) = check_url("downstream.base_url", &config.downstream.base_url, &mut errors) {
        if !matches!(url.scheme(), "http" | "https") {
            errors.push(ValidationError::Scheme {
                field: "downstream.base_url",
                value: config.downstream.base_url.clone(),
            });
        }
    }
    if config.downstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("downstream.timeout_secs"));
    }

    finish(errors)
}

pub fn validate_weather_service(config: &WeatherServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener(&config.listener, &mut errors);
    check_timeouts(&config.timeouts, &mut errors);
    check_observability(&config.observability, &mut errors);

    check_url("location.base_url", &config.location.base_url, &mut errors);
    if config.location.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("location.timeout_secs"));
    }

    check_url("weather.base_url", &config.weather.base_url, &mut errors);
    if config.weather.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("weather.timeout_secs"));
    }
    if config.weather.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    finish(errors)
}

fn check_listener(listener: &ListenerConfig, errors: &mut Vec<ValidationError>) {
    if listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: listener.bind_address.clone(),
        });
    }
}

fn check_timeouts(timeouts: &TimeoutConfig, errors: &mut Vec<ValidationError>) {
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
}

fn check_observability(observability: &ObservabilityConfig, errors: &mut Vec<ValidationError>) {
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::Url {
                field,
                value: value.to_string(),
                reason: "not a base URL".to_string(),
            });
            None
        }
        Ok(url) => Some(url),
        Err(e) => {
            errors.push(ValidationError::Url {
                field,
                value: value.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_config() -> WeatherServiceConfig {
        let mut config = WeatherServiceConfig::default();
        config.weather.api_key = "secret".to_string();
        config
    }

    #[test]
    fn test_defaults_are_valid_for_gateway() {
        assert_eq!(validate_gateway(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_weather_service_requires_api_key() {
        let errors = validate_weather_service(&WeatherServiceConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingApiKey]);

        assert_eq!(validate_weather_service(&weather_config()), Ok(()));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = weather_config();
        config.weather.api_key = "   ".to_string();
        assert!(validate_weather_service(&config)
            .unwrap_err()
            .contains(&ValidationError::MissingApiKey));
    }

    #[test]
    fn test_gateway_accepts_https_downstream() {
        let mut config = GatewayConfig::default();
        config.downstream.base_url = "https://service-b:8081".to_string();
        assert!(validate_gateway(&config).is_ok());
    }

    #[test]
    fn test_gateway_rejects_other_schemes() {
        let mut config = GatewayConfig::default();
        config.downstream.base_url = "ftp://service-b:8081".to_string();

        let errors = validate_gateway(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::Scheme { .. }));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = weather_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.location.base_url = "::".to_string();
        config.weather.timeout_secs = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_weather_service(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroTimeout("weather.timeout_secs")));
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.request_secs")));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".to_string();
        assert_eq!(validate_gateway(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert!(validate_gateway(&config).is_err());
    }
}
