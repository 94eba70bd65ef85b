//! Startup orchestration.
//!
//! `start_*` binds the listener and spawns the server; the returned
//! [`RunningService`] is the only way to stop it.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{GatewayConfig, WeatherServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::Propagation;

#[derive(Debug, Error)]
pub enum ServiceStartError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to set up TLS for the downstream client: {0}")]
    Tls(#[from] rustls::Error),
}

/// A service accepting traffic.
pub struct RunningService {
    service: &'static str,
    local_addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningService {
    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://{local_addr}`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stop accepting, let in-flight requests finish, then return.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        };
        tracing::info!(service = self.service, "Service drained");
        result
    }
}

/// Start the gateway on `config.listener.bind_address`.
pub async fn start_gateway(
    config: &GatewayConfig,
    propagation: Propagation,
) -> Result<RunningService, ServiceStartError> {
    let server = HttpServer::gateway(config, propagation)?;
    start(server, &config.listener.bind_address).await
}

/// Start the weather service on `config.listener.bind_address`.
pub async fn start_weather_service(
    config: &WeatherServiceConfig,
    propagation: Propagation,
) -> Result<RunningService, ServiceStartError> {
    let server = HttpServer::weather_service(config, propagation)?;
    start(server, &config.listener.bind_address).await
}

/// Bind `bind_address` and serve `server` in the background.
pub async fn start(server: HttpServer, bind_address: &str) -> Result<RunningService, ServiceStartError> {
    let bind_error = |source| ServiceStartError::Bind {
        address: bind_address.to_string(),
        source,
    };

    let listener = TcpListener::bind(bind_address).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    let service = server.service();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, signal));

    tracing::info!(service, address = %local_addr, "Service started");
    Ok(RunningService {
        service,
        local_addr,
        shutdown,
        handle,
    })
}
