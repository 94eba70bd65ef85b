//! Outbound calls to the external lookup services.
//!
//! # Data Flow
//! ```text
//! PostalCode
//!     → location.rs (ViaCEP: `{base}/{cep}/json/`) → Location
//!     → weather.rs  (WeatherAPI: `{base}/current.json?key&q`) → WeatherSample
//! ```
//!
//! # Design Decisions
//! - Each call has its own deadline; a timeout is a call failure
//! - One attempt per call, no retries
//! - Every request carries the caller's trace context
//! - Resolvers are traits so the weather service can run against fakes

pub mod client;
pub mod error;
pub mod location;
pub mod weather;

pub use error::{LookupError, UpstreamError};
pub use location::{LocationResolver, ViaCepClient};
pub use weather::{WeatherApiClient, WeatherResolver};
