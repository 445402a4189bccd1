use crate::error::TransportError;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of the environment variables read by [`EnvConfigSource`]
pub const ENV_PREFIX: &str = "SOA_";

/// Where the API gateway lives
///
/// Environment keys: `SOA_GATEWAY_URL`, `SOA_GATEWAY_URI`, `SOA_DOMAIN`.
/// Values are taken as text even when the environment provider reads them as
/// numbers or booleans, so `SOA_GATEWAY_URI=8080` yields `"8080"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Full gateway URL; when set it is used verbatim
    #[serde(deserialize_with = "optional_scalar_text")]
    pub gateway_url: Option<String>,
    /// Gateway host label (`api-gateway` in `api-gateway.example.com`)
    #[serde(deserialize_with = "scalar_text")]
    pub gateway_uri: String,
    /// Domain the gateway host sits under
    #[serde(rename = "domain", deserialize_with = "scalar_text")]
    pub service_domain: String,
}

impl GatewaySettings {
    /// Settings pointing at a fixed gateway URL
    pub fn with_gateway_url(url: impl Into<String>) -> Self {
        Self {
            gateway_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// The override URL, unless it is absent or empty
    #[must_use]
    pub fn gateway_url_override(&self) -> Option<&str> {
        self.gateway_url.as_deref().filter(|url| !url.is_empty())
    }

    fn normalized(mut self) -> Self {
        if self.gateway_url_override().is_none() {
            self.gateway_url = None;
        }
        self
    }
}

/// Any scalar a configuration provider may produce from an environment value
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(deserializer).map(|value| value.map(String::from))
}

/// Capability that yields the gateway settings once, at service construction
pub trait GatewayConfigSource {
    /// # Errors
    /// Returns `TransportError::Config` when the settings cannot be read.
    fn load(&self) -> Result<GatewaySettings, TransportError>;
}

impl GatewayConfigSource for GatewaySettings {
    fn load(&self) -> Result<GatewaySettings, TransportError> {
        Ok(self.clone().normalized())
    }
}

/// Reads gateway settings from `SOA_*` environment variables
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    prefix: String,
}

impl EnvConfigSource {
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayConfigSource for EnvConfigSource {
    fn load(&self) -> Result<GatewaySettings, TransportError> {
        let settings: GatewaySettings =
            Figment::from(Serialized::defaults(GatewaySettings::default()))
                .merge(Env::prefixed(&self.prefix))
                .extract()
                .map_err(|e| TransportError::Config(e.to_string()))?;

        tracing::debug!(
            gateway_url_set = settings.gateway_url_override().is_some(),
            gateway_uri = %settings.gateway_uri,
            domain = %settings.service_domain,
            "loaded gateway settings"
        );
        Ok(settings.normalized())
    }
}
