//! Response envelope shared by fleet services and the API gateway.
//!
//! ```json
//! {"status": "ok", "code": 200, "message": "", "data": {"type": "consumer", "content": {...}}}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while pulling typed content out of an envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The envelope has no `data` member
    #[error("envelope carries no data")]
    MissingData,

    /// `data.type` names something other than the requested key
    #[error("expected data of type '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// `data.content` does not have the requested shape
    #[error("cannot decode '{key}' content: {source}")]
    Content {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed payload of an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Standard `{status, code, message, data}` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopeData>,
}

impl ServiceEnvelope {
    /// Decode `data.content` as `T` when `data.type` equals `key`
    ///
    /// # Errors
    /// Returns [`EnvelopeError`] when the data is absent, has another type,
    /// or its content does not decode as `T`.
    pub fn extract_data<T: DeserializeOwned>(&self, key: &str) -> Result<T, EnvelopeError> {
        let data = self.data.as_ref().ok_or(EnvelopeError::MissingData)?;
        if data.data_type != key {
            return Err(EnvelopeError::TypeMismatch {
                expected: key.to_owned(),
                found: data.data_type.clone(),
            });
        }

        T::deserialize(&data.content).map_err(|source| EnvelopeError::Content {
            key: key.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::token::Consumer;
    use serde_json::json;

    fn consumer_envelope() -> ServiceEnvelope {
        serde_json::from_value(json!({
            "status": "ok",
            "code": 200,
            "message": "",
            "data": {
                "type": "consumer",
                "content": {"tokens": [{"type": "jwt", "value": "xxxx.xxxx.xxxx"}]}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_data() {
        let consumer: Consumer = consumer_envelope().extract_data("consumer").unwrap();
        assert_eq!(consumer.tokens[0].value, "xxxx.xxxx.xxxx");
    }

    #[test]
    fn test_extract_data_type_mismatch() {
        let err = consumer_envelope()
            .extract_data::<Consumer>("orders")
            .unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::TypeMismatch { ref expected, ref found }
                if expected == "orders" && found == "consumer"
        ));
    }

    #[test]
    fn test_extract_data_missing() {
        let envelope: ServiceEnvelope =
            serde_json::from_value(json!({"status": "fail", "code": 401, "message": "nope"}))
                .unwrap();
        assert!(matches!(
            envelope.extract_data::<Consumer>("consumer"),
            Err(EnvelopeError::MissingData)
        ));
    }

    #[test]
    fn test_extract_data_bad_shape() {
        let envelope: ServiceEnvelope = serde_json::from_value(json!({
            "data": {"type": "consumer", "content": {"tokens": "not-a-list"}}
        }))
        .unwrap();
        let err = envelope.extract_data::<Consumer>("consumer").unwrap_err();
        assert!(matches!(err, EnvelopeError::Content { ref key, .. } if key == "consumer"));
    }

    #[test]
    fn test_missing_fields_default() {
        let envelope: ServiceEnvelope = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope, ServiceEnvelope::default());
    }
}
