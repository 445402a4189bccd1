use crate::constants::AUTH_HEADER_PREFIX;
use serde::{Deserialize, Serialize};

/// Authentication token issued by the API gateway
///
/// Lives only for the duration of one dial; nothing caches it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub value: String,
}

impl Token {
    /// Render the token as an `Authorization` header value
    #[must_use]
    pub fn prepare_for_http(&self) -> String {
        format!("{AUTH_HEADER_PREFIX}{}", self.value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Consumer record returned by a successful gateway login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default)]
    pub tokens: Vec<Token>,
}
