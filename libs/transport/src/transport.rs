use crate::error::TransportError;
use crate::request::Request;
use async_trait::async_trait;
use transport_http::HttpResponse;

/// Dial-then-call contract shared by direct and gateway-routed services
///
/// `dial` prepares and stores one outbound request; `call` sends the stored
/// request and may be repeated. A failed dial leaves the previously stored
/// request in place.
#[async_trait]
pub trait ServiceTransport: Send + Sync {
    /// Build the outbound request for `request` and store it
    ///
    /// # Errors
    /// Returns [`TransportError`] when the request cannot be built or, for
    /// gateway-routed services, when authentication fails.
    async fn dial(&mut self, request: Request) -> Result<(), TransportError>;

    /// Send the stored request
    ///
    /// # Errors
    /// Returns `TransportError::NotDialed` before the first successful dial and
    /// `TransportError::TransportCallFailed` when the exchange fails.
    async fn call(&self) -> Result<HttpResponse, TransportError>;

    /// Configured service name, before any namespace prefixing
    fn name(&self) -> &str;
}
