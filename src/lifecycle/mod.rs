//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build clients → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     stop() → Stop accepting → Drain in-flight requests → Join
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop()
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)
//! - In-flight requests always complete before `stop()` returns

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start_gateway, start_weather_service, RunningService, ServiceStartError};
