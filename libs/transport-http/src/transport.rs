use crate::client::HttpClient;
use crate::error::HttpError;
use crate::response::HttpResponse;
use async_trait::async_trait;
use bytes::Bytes;

/// Capability to execute one fully prepared HTTP request
///
/// Fleet services hold an `Arc<dyn HttpTransport>` so a shared client, or a
/// recording double in tests, can be injected.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the response, whatever its status
    ///
    /// # Errors
    /// Returns `HttpError` for URL, transport, TLS and timeout failures.
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, HttpError>;
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, HttpError> {
        HttpClient::execute(self, request).await
    }
}
