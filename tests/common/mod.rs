//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use cep_weather::config::{GatewayConfig, WeatherServiceConfig};
use cep_weather::lifecycle::{self, RunningService};
use cep_weather::observability::Propagation;
use httpmock::MockServer;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-key";

/// What a programmable backend answers with.
pub struct Canned {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl Canned {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body: body.into(),
        }
    }
}

/// Request heads (request line plus headers) seen by a backend, lowercased.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<String>>>);

impl Captured {
    pub fn heads(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> String {
        self.heads().pop().expect("backend saw no request")
    }
}

/// Start a raw HTTP/1.1 backend on an ephemeral port. `f` computes the
/// response for every connection.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Captured)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Canned> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Captured::default();
    let f = Arc::new(f);

    let seen = captured.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        seen.0.lock().unwrap().push(head.to_ascii_lowercase());

                        let canned = f().await;
                        let reason = StatusCode::from_u16(canned.status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let mut response = format!("HTTP/1.1 {} {}\r\n", canned.status, reason);
                        if let Some(content_type) = canned.content_type {
                            response.push_str(&format!("Content-Type: {}\r\n", content_type));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            canned.body.len(),
                            canned.body
                        ));
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

/// Backend that always answers the same thing.
pub async fn start_fixed_backend(canned: Canned) -> (SocketAddr, Captured) {
    let Canned {
        status,
        content_type,
        body,
    } = canned;
    start_programmable_backend(move || {
        let body = body.clone();
        async move {
            Canned {
                status,
                content_type,
                body,
            }
        }
    })
    .await
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// ViaCEP-shaped payload for a known code.
pub fn viacep_found(city: &str) -> Value {
    json!({
        "cep": "01001-000",
        "logradouro": "Praça da Sé",
        "bairro": "Sé",
        "localidade": city,
        "uf": "SP",
    })
}

/// WeatherAPI-shaped payload.
pub fn weather_payload(temp_c: f64) -> Value {
    json!({
        "location": { "name": "São Paulo", "country": "Brazil" },
        "current": { "temp_c": temp_c, "temp_f": temp_c * 1.8 + 32.0, "humidity": 60 },
    })
}

/// Weather service config pointing at two mock servers. The location
/// API is served under `/ws`, the weather API under `/v1`.
pub fn weather_config(location: &MockServer, weather: &MockServer) -> WeatherServiceConfig {
    let mut config = WeatherServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.location.base_url = location.url("/ws");
    config.weather.base_url = weather.url("/v1");
    config.weather.api_key = API_KEY.to_string();
    config
}

pub fn gateway_config(downstream_base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.downstream.base_url = downstream_base.to_string();
    config
}

pub async fn start_weather(config: &WeatherServiceConfig) -> RunningService {
    lifecycle::start_weather_service(config, Propagation::new())
        .await
        .unwrap()
}

pub async fn start_gateway(config: &GatewayConfig) -> RunningService {
    lifecycle::start_gateway(config, Propagation::new()).await.unwrap()
}

/// Client that never goes through a proxy from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Response reduced to what the tests compare.
#[derive(Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Reply {
    pub async fn read(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap();
        Self {
            status,
            content_type,
            body,
        }
    }
}

/// `POST /` on the gateway with a raw body.
pub async fn post_cep(gateway: &RunningService, body: &str) -> Reply {
    let response = client()
        .post(format!("{}/", gateway.base_url()))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    Reply::read(response).await
}

/// `GET /weather/{cep}` on the weather service.
pub async fn get_weather(service: &RunningService, cep: &str) -> Reply {
    let response = client()
        .get(format!("{}/weather/{}", service.base_url(), cep))
        .send()
        .await
        .unwrap();
    Reply::read(response).await
}
