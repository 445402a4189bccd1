use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::{Request, Response, Uri};
use http_body_util::Full;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;

/// Type-erased middleware stack shared by every clone of the client
pub(crate) type ClientService =
    BoxCloneSyncService<Request<Full<Bytes>>, Response<ResponseBody>, HttpError>;

/// HTTP client with tower middleware stack
///
/// The stack applies a per-request timeout, User-Agent injection, response
/// decompression and a bounded redirect policy. Requests are never retried.
///
/// `HttpClient` is `Clone + Send + Sync`; cloning shares the connection pool.
///
/// ```ignore
/// let request = http::Request::get("http://inventory-master-staging.inventory/things")
///     .body(Bytes::new())?;
/// let things = client.execute(request).await?.bytes().await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: ClientService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("transport_security", &self.transport_security)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Send a fully built request through the middleware stack
    ///
    /// The URI must be absolute; `http://` additionally requires
    /// [`TransportSecurity::AllowInsecureHttp`]. Returns `Ok` for every HTTP status.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidUri` or `HttpError::InvalidScheme` when the
    /// URI is not acceptable, `HttpError::Timeout` when the exchange exceeds the
    /// configured timeout, and `HttpError::Transport`/`HttpError::Tls` for
    /// connection failures.
    pub async fn execute(&self, request: Request<Bytes>) -> Result<HttpResponse, HttpError> {
        check_scheme(request.uri(), self.transport_security)?;
        if request.uri().authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: request.uri().to_string(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        tracing::debug!(method = %request.method(), uri = %request.uri(), "sending request");

        let request = request.map(Full::new);
        let inner = self.service.clone().oneshot(request).await?;

        tracing::debug!(status = %inner.status(), "received response");

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

/// Check a request URI against the transport security mode
fn check_scheme(uri: &Uri, transport: TransportSecurity) -> Result<(), HttpError> {
    match uri.scheme_str() {
        Some("https") => Ok(()),
        Some("http") => match transport {
            TransportSecurity::AllowInsecureHttp => Ok(()),
            TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
            }),
        },
        Some(scheme) => Err(HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: "only http:// and https:// schemes are supported".to_owned(),
        }),
        None => Err(HttpError::InvalidUri {
            url: uri.to_string(),
            kind: InvalidUriKind::MissingScheme,
            reason: "missing scheme".to_owned(),
        }),
    }
}
