//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway:
//!     POST / → server.rs (request ID, request span, timeout)
//!            → forward.rs (parse body, validate CEP)
//!            → GET {downstream}/weather/{cep} (trace context injected)
//!            → relay status, Content-Type and body unchanged
//!
//! Weather service:
//!     GET /weather/{cep} → server.rs (parent span from traceparent)
//!            → weather.rs (validate → location → weather → convert)
//!            → 200 JSON report, or response.rs plain-text error
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod weather;

pub use request::X_REQUEST_ID;
pub use response::ServiceError;
pub use server::{GatewayState, HttpServer, WeatherState};
