use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::UserAgentLayer;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use tower_http::follow_redirect::FollowRedirectLayer;
use tower_http::follow_redirect::policy::Limited;

/// Builder for constructing an [`HttpClient`](crate::HttpClient) with a layered tower stack.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response body size
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set transport security mode
    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Allow plain HTTP connections
    ///
    /// Equivalent to `.transport(TransportSecurity::AllowInsecureHttp)`.
    /// Only available in debug builds or with the `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Set TLS root certificate strategy
    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// Set the redirect hop limit (`0` returns every 3xx to the caller)
    #[must_use]
    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.config.max_redirects = hops;
        self
    }

    /// Set the idle connection timeout for the pool
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum number of idle connections per host
    #[must_use]
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Build the HTTP client
    ///
    /// # Errors
    /// Returns `HttpError::Tls` if the root store cannot be assembled, or
    /// `HttpError::InvalidHeaderValue` if the user agent is not a valid header value.
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::debug!("plain HTTP enabled for this client");
        }

        let timeout = self.config.request_timeout;
        let https = tls::build_https_connector(self.config.tls_roots, self.config.transport)?;

        // pool_timer is required for pool_idle_timeout to take effect
        let mut client_builder = Client::builder(TokioExecutor::new());
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .http2_only(false);
        if let Some(idle_timeout) = self.config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle_timeout);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let ua_layer = UserAgentLayer::try_new(&self.config.user_agent)?;

        // Request flow (outer to inner):
        //   ErrorMapping -> Timeout -> UserAgent -> Decompression -> FollowRedirect -> hyper
        //
        // Every HTTP status comes back as Ok; only transport, TLS and timeout
        // failures are errors. There is no retry layer.
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(ua_layer)
            .layer(DecompressionLayer::new())
            .layer(FollowRedirectLayer::with_policy(Limited::new(
                self.config.max_redirects,
            )))
            .service(hyper_client)
            .map_response(map_decompression_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

        Ok(crate::HttpClient {
            service: tower::util::BoxCloneSyncService::new(service),
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

/// Boxes the decompression body into [`ResponseBody`]
fn map_decompression_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    let boxed_body: ResponseBody = body.map_err(Into::into).boxed();
    Response::from_parts(parts, boxed_body)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT};

    #[test]
    fn test_builder_default() {
        let builder = HttpClientBuilder::new();
        assert_eq!(builder.config.request_timeout, Duration::from_secs(5));
        assert_eq!(builder.config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(builder.config.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(builder.config.transport, TransportSecurity::TlsOnly);
    }

    #[test]
    fn test_builder_setters() {
        let builder = HttpClientBuilder::with_config(HttpClientConfig::in_cluster())
            .timeout(Duration::from_secs(2))
            .user_agent("orders/1.4")
            .max_body_size(4096)
            .max_redirects(0)
            .tls_roots(TlsRootConfig::Native)
            .pool_idle_timeout(None)
            .pool_max_idle_per_host(2);

        assert_eq!(builder.config.request_timeout, Duration::from_secs(2));
        assert_eq!(builder.config.user_agent, "orders/1.4");
        assert_eq!(builder.config.max_body_size, 4096);
        assert_eq!(builder.config.max_redirects, 0);
        assert_eq!(builder.config.tls_roots, TlsRootConfig::Native);
        assert_eq!(builder.config.pool_idle_timeout, None);
        assert_eq!(builder.config.pool_max_idle_per_host, 2);
        assert_eq!(
            builder.config.transport,
            TransportSecurity::AllowInsecureHttp
        );
    }

    #[test]
    fn test_builder_allow_insecure_http() {
        let builder = HttpClientBuilder::new().allow_insecure_http();
        assert_eq!(
            builder.config.transport,
            TransportSecurity::AllowInsecureHttp
        );
    }

    #[tokio::test]
    async fn test_builder_build() {
        let client = HttpClientBuilder::new().build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_builder_build_invalid_user_agent() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[test]
    fn test_map_tower_error_timeout() {
        let err: tower::BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let mapped = map_tower_error(err, Duration::from_secs(5));
        assert!(matches!(mapped, HttpError::Timeout(d) if d == Duration::from_secs(5)));
    }

    #[test]
    fn test_map_tower_error_passes_http_error_through() {
        let err: tower::BoxError = Box::new(HttpError::Timeout(Duration::from_secs(1)));
        let mapped = map_tower_error(err, Duration::from_secs(5));
        assert!(matches!(mapped, HttpError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[test]
    fn test_map_tower_error_wraps_unknown_as_transport() {
        let err: tower::BoxError = "connection reset".into();
        let mapped = map_tower_error(err, Duration::from_secs(5));
        assert!(matches!(mapped, HttpError::Transport(_)));
    }
}
