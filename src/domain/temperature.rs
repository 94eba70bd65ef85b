//! Locality, weather and temperature report types.

use serde::{Deserialize, Serialize};

/// Fahrenheit = Celsius * 1.8 + 32.
const FAHRENHEIT_SCALE: f64 = 1.8;
const FAHRENHEIT_OFFSET: f64 = 32.0;

/// Kelvin = Celsius + 273. Not 273.15; clients depend on this value.
const KELVIN_OFFSET: f64 = 273.0;

/// Convert Celsius to `(fahrenheit, kelvin)` without rounding.
pub fn convert(celsius: f64) -> (f64, f64) {
    (
        celsius * FAHRENHEIT_SCALE + FAHRENHEIT_OFFSET,
        celsius + KELVIN_OFFSET,
    )
}

/// Outcome of decoding a locality lookup payload.
///
/// `found == false` is a normal answer from the lookup service; the
/// resolver turns it into a not-found error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResult {
    pub locality: String,
    pub found: bool,
}

/// A resolved locality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub locality: String,
}

/// Current temperature for a locality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub celsius: f64,
}

/// Response payload of the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReport {
    pub city: String,
    #[serde(rename = "temp_C")]
    pub celsius: f64,
    #[serde(rename = "temp_F")]
    pub fahrenheit: f64,
    #[serde(rename = "temp_K")]
    pub kelvin: f64,
}

impl TemperatureReport {
    pub fn new(city: impl Into<String>, sample: WeatherSample) -> Self {
        let (fahrenheit, kelvin) = convert(sample.celsius);
        Self {
            city: city.into(),
            celsius: sample.celsius,
            fahrenheit,
            kelvin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_known_values() {
        assert_eq!(convert(25.0), (77.0, 298.0));
        assert_eq!(convert(0.0), (32.0, 273.0));
        assert_eq!(convert(-10.0), (14.0, 263.0));
    }

    #[test]
    fn test_convert_keeps_full_precision() {
        let (f, k) = convert(28.5);
        assert_eq!(f, 28.5 * 1.8 + 32.0);
        assert!((f - 83.3).abs() < 1e-9);
        assert_eq!(k, 301.5);
    }

    #[test]
    fn test_kelvin_offset_is_273() {
        for c in [-40.0, -0.5, 0.0, 12.25, 36.6, 100.0] {
            let (_, k) = convert(c);
            assert_eq!(k, c + 273.0);
        }
    }

    #[test]
    fn test_report_field_names() {
        let report = TemperatureReport::new("São Paulo", WeatherSample { celsius: 21.0 });
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["city"], "São Paulo");
        assert_eq!(value["temp_C"], 21.0);
        assert_eq!(value["temp_F"], 21.0 * 1.8 + 32.0);
        assert_eq!(value["temp_K"], 294.0);
        assert_eq!(value.as_object().unwrap().len(), 4);
    }
}
