//! Postal code → locality lookup (ViaCEP).

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::config::LocationApiConfig;
use crate::domain::{Location, LocationResult, PostalCode};
use crate::observability::{record_failure, Propagation};
use crate::upstream::client::JsonCall;
use crate::upstream::error::LookupError;

/// Dependency name used in messages and metrics.
pub const SERVICE: &str = "zipcode lookup";

/// Resolves a postal code to a locality.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// A code the lookup service does not know yields
    /// [`LookupError::NotFound`]; anything else that goes wrong is
    /// [`LookupError::Upstream`].
    async fn resolve(&self, code: &PostalCode) -> Result<Location, LookupError>;
}

/// ViaCEP response. Unknown codes come back as `200 {"erro": true}`.
#[derive(Debug, Default, Deserialize)]
struct ViaCepPayload {
    #[serde(default)]
    localidade: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    erro: bool,
}

// Older ViaCEP answers `"erro": true`, newer ones `"erro": "true"`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Text(text) => text.eq_ignore_ascii_case("true"),
    })
}

impl From<ViaCepPayload> for LocationResult {
    fn from(payload: ViaCepPayload) -> Self {
        let found = !payload.erro && !payload.localidade.trim().is_empty();
        Self {
            locality: payload.localidade,
            found,
        }
    }
}

/// HTTP client for a ViaCEP-compatible API.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    call: JsonCall,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(config: &LocationApiConfig, propagation: Propagation) -> Result<Self, reqwest::Error> {
        Ok(Self {
            call: JsonCall::new(SERVICE, config.timeout(), propagation)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, code: &PostalCode) -> String {
        format!("{}/{}/json/", self.base_url, code)
    }
}

#[async_trait]
impl LocationResolver for ViaCepClient {
    #[tracing::instrument(
        name = "resolve_location",
        skip_all,
        fields(cep = %code, city.name = tracing::field::Empty, otel.status_code = tracing::field::Empty)
    )]
    async fn resolve(&self, code: &PostalCode) -> Result<Location, LookupError> {
        let request = self.call.client().get(self.url(code)).build();
        let result: LocationResult = match self.call.execute::<ViaCepPayload>(request).await {
            Ok(payload) => payload.into(),
            Err(e) => {
                record_failure(&tracing::Span::current(), &e);
                return Err(e.into());
            }
        };

        if !result.found {
            tracing::info!("Postal code not found");
            return Err(LookupError::NotFound);
        }

        tracing::Span::current().record("city.name", result.locality.as_str());
        Ok(Location {
            locality: result.locality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> LocationResult {
        serde_json::from_str::<ViaCepPayload>(body).unwrap().into()
    }

    #[test]
    fn test_found_payload() {
        let result = decode(r#"{"cep":"01001-000","localidade":"São Paulo","uf":"SP"}"#);
        assert!(result.found);
        assert_eq!(result.locality, "São Paulo");
    }

    #[test]
    fn test_erro_flag_bool_and_string() {
        assert!(!decode(r#"{"erro": true}"#).found);
        assert!(!decode(r#"{"erro": "true"}"#).found);
        assert!(decode(r#"{"erro": false, "localidade": "Recife"}"#).found);
    }

    #[test]
    fn test_blank_locality_is_not_found() {
        assert!(!decode(r#"{"localidade": ""}"#).found);
        assert!(!decode("{}").found);
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        assert!(serde_json::from_str::<ViaCepPayload>(r#"{"localidade": 12}"#).is_err());
        assert!(serde_json::from_str::<ViaCepPayload>("<html></html>").is_err());
    }

    #[test]
    fn test_url_layout() {
        let config = LocationApiConfig {
            base_url: "http://127.0.0.1:9/ws/".to_string(),
            timeout_secs: 5,
        };
        let client = ViaCepClient::new(&config, Propagation::new()).unwrap();
        let code = PostalCode::parse("01001000").unwrap();
        assert_eq!(client.url(&code), "http://127.0.0.1:9/ws/01001000/json/");
    }
}
