use crate::constants::{PROTOCOL_HTTP, PROTOCOL_HTTPS};
use bytes::Bytes;
use http::Method;
use std::collections::BTreeMap;
use std::fmt;

/// Transfer protocol for an outbound call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
    /// Defer to the service preference, then HTTPS
    #[default]
    Unspecified,
}

impl Protocol {
    /// Parse a protocol token; only `http` and `https` are recognised
    ///
    /// Any other token (including the empty string) yields HTTPS.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            PROTOCOL_HTTP => Self::Http,
            _ => Self::Https,
        }
    }

    /// Pick the first specified protocol, falling back to HTTPS
    #[must_use]
    pub fn resolve(self, fallback: Protocol) -> Protocol {
        match (self, fallback) {
            (Self::Unspecified, Self::Unspecified) => Self::Https,
            (Self::Unspecified, other) => other,
            (own, _) => own,
        }
    }

    /// URL scheme for this protocol; unspecified renders as HTTPS
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => PROTOCOL_HTTP,
            Self::Https | Self::Unspecified => PROTOCOL_HTTPS,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound call to a fleet service resource
///
/// A request is consumed by `dial`; its body moves into the prepared request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Method,
    /// Resource path below the service root, without a leading slash
    pub resource: String,
    pub body: Option<Bytes>,
    /// Query parameters; keys encode in sorted order, values in insertion order
    pub query: BTreeMap<String, Vec<String>>,
    pub headers: BTreeMap<String, String>,
    pub protocol: Protocol,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append a value for a query key
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// URL-encoded query string without the leading `?`; empty when there is no query
    ///
    /// # Errors
    /// Returns the encoder error, which in practice never happens for string pairs.
    pub fn encoded_query(&self) -> Result<String, serde_urlencoded::ser::Error> {
        let pairs: Vec<(&str, &str)> = self
            .query
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
            .collect();
        serde_urlencoded::to_string(pairs)
    }

    /// Append `/{resource}` and the encoded query to `base`
    pub(crate) fn resource_url(&self, base: &str) -> Result<String, serde_urlencoded::ser::Error> {
        let mut url = format!("{base}/{}", self.resource);
        let query = self.encoded_query()?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}
