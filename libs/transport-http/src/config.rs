use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("microservice-transport/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout shared by every fleet client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum number of redirect hops followed before the 3xx is returned as-is
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// TLS root certificate configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Use Mozilla's root certificates (webpki-roots, no OS dependency)
    #[default]
    WebPki,
    /// Use OS native root certificate store
    Native,
}

/// Transport security configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Require TLS for all connections (HTTPS only)
    #[default]
    TlsOnly,
    /// Allow plain HTTP next to HTTPS
    ///
    /// Needed for in-cluster service DNS names, which are served over plain
    /// HTTP, and for local mock servers.
    AllowInsecureHttp,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout (default: 5 seconds)
    ///
    /// Covers connecting, sending the request and receiving response headers,
    /// including any redirect hops. Body reads are bounded by `max_body_size`.
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// TLS root certificate strategy (default: `WebPki`)
    pub tls_roots: TlsRootConfig,

    /// Redirect hop limit; `0` disables redirect following
    pub max_redirects: usize,

    /// Timeout for idle connections in the pool (default: 90 seconds)
    ///
    /// Set to `None` to use hyper-util's default idle timeout.
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum number of idle connections per host (default: 32)
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_size: 10 * 1024 * 1024, // 10 MB
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for calls that stay inside the cluster network
    ///
    /// Service DNS names resolve to plain HTTP endpoints, so this preset
    /// accepts both `http://` and `https://` URLs. The gateway is still
    /// reached over TLS when its URL says so.
    #[must_use]
    pub fn in_cluster() -> Self {
        Self {
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }

    /// Create configuration for testing with mock servers (allows insecure HTTP)
    ///
    /// **WARNING**: This configuration allows plain HTTP connections.
    /// Use only for local testing with mock servers, never in production.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024, // 1 MB
            transport: TransportSecurity::AllowInsecureHttp,
            max_redirects: 3,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}
