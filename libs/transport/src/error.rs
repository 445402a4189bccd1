use crate::envelope::EnvelopeError;
use thiserror::Error;
use transport_http::HttpError;

/// Failures of the gateway login handshake
///
/// Messages never contain credentials, tokens or response bodies.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Email or password is empty; nothing was sent
    #[error("missing credentials")]
    MissingCredentials,

    /// The login request could not be built or sent
    #[error("{0}")]
    LoginRequestFailed(String),

    /// The login response body is not a service envelope
    #[error("cannot decode login response: {0}")]
    ResponseDecodeFailed(String),

    /// The gateway rejected the credentials (401 or 404)
    #[error("login unauthorised (HTTP {status})")]
    LoginUnauthorised { status: http::StatusCode },

    /// The gateway answered with an unexpected status
    #[error("api gateway login failed ({status}): {message}")]
    GatewayLoginFailed {
        status: http::StatusCode,
        message: String,
    },

    /// The envelope does not carry a consumer
    #[error("could not extract consumer data: {0}")]
    ConsumerExtractionFailed(#[source] EnvelopeError),

    /// The consumer has no tokens
    #[error("consumer has no tokens")]
    ConsumerHasNoTokens,
}

/// Errors surfaced by [`ServiceTransport`](crate::ServiceTransport) operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("cannot authenticate for cloud service: {0}")]
    Authentication(#[source] AuthError),

    /// The HTTP layer rejected the URL, method or a header
    #[error("cannot build service request: {0}")]
    RequestConstructionFailed(String),

    #[error("{0}")]
    TransportCallFailed(String),

    /// `call` was invoked before a successful `dial`
    #[error("no request has been dialed")]
    NotDialed,

    /// Gateway settings could not be loaded
    #[error("gateway configuration error: {0}")]
    Config(String),
}

impl From<AuthError> for TransportError {
    fn from(err: AuthError) -> Self {
        Self::Authentication(err)
    }
}

/// Render an [`HttpError`] with a context prefix
#[must_use]
pub fn format_http_error(e: &HttpError, prefix: &str) -> String {
    match e {
        HttpError::Timeout(duration) => format!("{prefix} request timed out after {duration:?}"),
        HttpError::Transport(err) => format!("{prefix} transport error: {err}"),
        HttpError::BodyTooLarge { limit, actual } => {
            format!("{prefix} response too large: limit {limit} bytes, got {actual} bytes")
        }
        HttpError::Tls(err) => format!("{prefix} TLS error: {err}"),
        HttpError::InvalidHeaderValue(err) => format!("{prefix} invalid header value: {err}"),
        HttpError::InvalidUri { url, reason, .. } => {
            format!("{prefix} invalid URL '{url}': {reason}")
        }
        HttpError::InvalidScheme { scheme, reason } => {
            format!("{prefix} invalid scheme '{scheme}': {reason}")
        }
        _ => format!("{prefix} request failed"),
    }
}
