use crate::constants::{AGGREGATOR_DOMAIN_PREFIX, AGGREGATOR_NAMESPACE, DEFAULT_SERVICE_BRANCH};
use crate::domain::build_service_dns_name;
use crate::error::{TransportError, format_http_error};
use crate::request::{Protocol, Request};
use crate::transport::ServiceTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};
use std::collections::BTreeMap;
use std::sync::Arc;
use transport_http::{HttpClientBuilder, HttpClientConfig, HttpResponse, HttpTransport};

/// Identity of a fleet service
///
/// Dialing never modifies the target; derived names are computed per dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub branch: String,
    pub environment: String,
    pub namespace: String,
    pub name: String,
    /// Major version; `0` means unversioned
    pub version: u32,
    /// Protocol preference used when a request does not specify one
    pub protocol: Protocol,
}

impl ServiceTarget {
    pub fn new(
        branch: impl Into<String>,
        environment: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            environment: environment.into(),
            namespace: namespace.into(),
            name: name.into(),
            version: 0,
            protocol: Protocol::Unspecified,
        }
    }

    /// Target on the default branch
    pub fn on_default_branch(
        environment: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(DEFAULT_SERVICE_BRANCH, environment, namespace, name)
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Name used for addressing: `agg-{name}` inside the aggregators namespace
    #[must_use]
    pub fn effective_name(&self) -> String {
        if self.namespace == AGGREGATOR_NAMESPACE {
            format!("{AGGREGATOR_DOMAIN_PREFIX}-{}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// DNS namespace label: `{effective}-{version}` for versioned services
    #[must_use]
    pub fn namespace_suffix(&self) -> String {
        let name = self.effective_name();
        if self.version == 0 {
            name
        } else {
            format!("{name}-{}", self.version)
        }
    }

    /// In-cluster host name of the service
    #[must_use]
    pub fn dns_name(&self) -> String {
        build_service_dns_name(
            &self.effective_name(),
            &self.branch,
            &self.environment,
            &self.namespace_suffix(),
        )
    }
}

/// Outbound request produced by a dial, ready to be sent any number of times
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl PreparedRequest {
    pub(crate) fn new(method: Method, url: &str, body: Option<Bytes>) -> Result<Self, TransportError> {
        let uri = url
            .parse::<Uri>()
            .map_err(|e| TransportError::RequestConstructionFailed(format!("invalid URL '{url}': {e}")))?;
        Ok(Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: body.unwrap_or_default(),
        })
    }

    /// Full URL as a string
    #[must_use]
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// Header value as text, if present and visible ASCII
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn apply_headers(
        &mut self,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), TransportError> {
        for (name, value) in headers {
            self.insert_header(name, value)?;
        }
        Ok(())
    }

    /// Set a header, replacing any earlier value
    pub(crate) fn insert_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Like [`insert_header`](Self::insert_header) but the value is marked sensitive
    pub(crate) fn insert_secret_header(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<(), TransportError> {
        let (name, mut value) = header_pair(name, value)?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(())
    }

    fn to_http(&self) -> Result<http::Request<Bytes>, TransportError> {
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone())
            .body(self.body.clone())
            .map_err(|e| TransportError::RequestConstructionFailed(e.to_string()))?;
        *request.headers_mut() = self.headers.clone();
        Ok(request)
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let header_name = HeaderName::try_from(name).map_err(|e| {
        TransportError::RequestConstructionFailed(format!("invalid header name '{name}': {e}"))
    })?;
    let header_value = HeaderValue::try_from(value).map_err(|e| {
        TransportError::RequestConstructionFailed(format!("invalid value for header '{name}': {e}"))
    })?;
    Ok((header_name, header_value))
}

/// Build the HTTP client used when none is injected
///
/// The client permits `http://` as well as `https://`. The scheme of each call
/// still comes from the request or the target, defaulting to HTTPS.
pub(crate) fn default_http_transport() -> Result<Arc<dyn HttpTransport>, TransportError> {
    let client = HttpClientBuilder::with_config(HttpClientConfig::in_cluster())
        .build()
        .map_err(|e| TransportError::Config(format_http_error(&e, "HTTP client")))?;
    Ok(Arc::new(client))
}

/// Service reached directly through its in-cluster DNS name
///
/// ```ignore
/// let mut orders = Service::new(ServiceTarget::new("master", "staging", "orders", "orders"))?;
/// orders.dial(Request::new(Method::GET, "things")).await?;
/// let response = orders.call().await?;
/// ```
pub struct Service {
    target: ServiceTarget,
    http: Arc<dyn HttpTransport>,
    current_request: Option<PreparedRequest>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("target", &self.target)
            .field("current_request", &self.current_request)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Service backed by a fresh in-cluster HTTP client
    ///
    /// # Errors
    /// Returns `TransportError::Config` if the HTTP client cannot be built.
    pub fn new(target: ServiceTarget) -> Result<Self, TransportError> {
        Ok(Self::with_transport(target, default_http_transport()?))
    }

    /// Service sending through the given transport
    pub fn with_transport(target: ServiceTarget, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            target,
            http,
            current_request: None,
        }
    }

    #[must_use]
    pub fn target(&self) -> &ServiceTarget {
        &self.target
    }

    /// Request stored by the most recent successful dial
    #[must_use]
    pub fn current_request(&self) -> Option<&PreparedRequest> {
        self.current_request.as_ref()
    }

    #[must_use]
    pub fn effective_name(&self) -> String {
        self.target.effective_name()
    }

    pub(crate) fn http(&self) -> &dyn HttpTransport {
        self.http.as_ref()
    }

    pub(crate) fn store(&mut self, prepared: PreparedRequest) {
        self.current_request = Some(prepared);
    }

    /// Build the direct request without storing it
    ///
    /// # Errors
    /// Returns `TransportError::RequestConstructionFailed` if the URL or a header is invalid.
    pub fn prepare(&self, request: Request) -> Result<PreparedRequest, TransportError> {
        let protocol = request.protocol.resolve(self.target.protocol);
        let base = format!("{protocol}://{}", self.target.dns_name());
        let url = request
            .resource_url(&base)
            .map_err(|e| TransportError::RequestConstructionFailed(e.to_string()))?;

        let Request {
            method,
            body,
            headers,
            ..
        } = request;
        let mut prepared = PreparedRequest::new(method, &url, body)?;
        prepared.apply_headers(&headers)?;
        Ok(prepared)
    }

    pub(crate) async fn send_current(&self) -> Result<HttpResponse, TransportError> {
        let prepared = self
            .current_request
            .as_ref()
            .ok_or(TransportError::NotDialed)?;
        let request = prepared.to_http()?;
        self.http
            .execute(request)
            .await
            .map_err(|e| TransportError::TransportCallFailed(format_http_error(&e, "service call")))
    }
}

#[async_trait]
impl ServiceTransport for Service {
    async fn dial(&mut self, request: Request) -> Result<(), TransportError> {
        let prepared = self.prepare(request)?;
        tracing::debug!(
            service = %self.target.name,
            method = %prepared.method,
            url = %prepared.uri,
            "dialed service"
        );
        self.store(prepared);
        Ok(())
    }

    async fn call(&self) -> Result<HttpResponse, TransportError> {
        self.send_current().await
    }

    fn name(&self) -> &str {
        &self.target.name
    }
}
