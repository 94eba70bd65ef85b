//! CEP weather: Brazilian postal code → city → current temperature.
//!
//! Two chained HTTP services share this crate:
//! - the **gateway** validates `{"cep": ...}` and relays the answer of
//! - the **weather service**, which looks the code up, fetches the current
//!   temperature and answers with Celsius, Fahrenheit and Kelvin.
//!
//! One trace covers the whole chain: the trace context travels with every
//! inter-service and external call.

pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::{GatewayConfig, WeatherServiceConfig};
pub use domain::{is_valid, PostalCode, TemperatureReport};
pub use http::HttpServer;
pub use lifecycle::{RunningService, Shutdown};
