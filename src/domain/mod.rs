//! Domain values for the CEP → temperature pipeline.
//!
//! # Data Flow
//! ```text
//! raw path/body string
//!     → cep.rs (PostalCode, 8 ASCII digits)
//!     → [location lookup] → Location
//!     → [weather lookup]  → WeatherSample
//!     → temperature.rs (Celsius → Fahrenheit/Kelvin)
//!     → TemperatureReport (response payload)
//! ```
//!
//! # Design Decisions
//! - Pure values only; no I/O lives here
//! - Kelvin offset is 273, not 273.15 (response contract)

pub mod cep;
pub mod temperature;

pub use cep::{is_valid, InvalidPostalCode, PostalCode};
pub use temperature::{convert, Location, LocationResult, TemperatureReport, WeatherSample};
