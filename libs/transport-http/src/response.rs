use crate::config::HttpClientConfig;
use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use std::convert::Infallible;

/// Type alias for the boxed response body that supports decompression.
///
/// The body is type-erased so the decompression layer and test doubles can
/// both produce it.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// HTTP response of any status
///
/// Body reads never look at the status and stop with
/// `HttpError::BodyTooLarge` once the configured `max_body_size` is exceeded.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    /// Build a response from an in-memory body
    ///
    /// Used by [`HttpTransport`](crate::HttpTransport) implementations that do
    /// not talk to the network, such as recording doubles in tests.
    #[must_use]
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body = Full::new(body.into())
            .map_err(|never: Infallible| -> Box<dyn std::error::Error + Send + Sync> {
                match never {}
            })
            .boxed();
        let mut inner = Response::new(body);
        *inner.status_mut() = status;
        *inner.headers_mut() = headers;
        Self {
            inner,
            max_body_size: HttpClientConfig::default().max_body_size,
        }
    }

    /// Get the response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Get the response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the response body
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// Read the response body as UTF-8 text
    ///
    /// Invalid UTF-8 sequences are replaced with the replacement character.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn text(self) -> Result<String, HttpError> {
        let body = read_body_limited(self.inner, self.max_body_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Collects the (decompressed) body, failing once `limit` bytes are exceeded
async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(response.into_body());

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
