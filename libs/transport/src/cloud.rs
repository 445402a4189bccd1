use crate::constants::{
    AUTH_HEADER, CONSUMER_DATA_TYPE, SERVICE_VERSION_HEADER, STAGING_ENVIRONMENT,
};
use crate::credentials::AuthCredentials;
use crate::domain::build_cloud_service_url;
use crate::envelope::ServiceEnvelope;
use crate::error::{AuthError, TransportError, format_http_error};
use crate::request::Request;
use crate::service::{PreparedRequest, Service, ServiceTarget, default_http_transport};
use crate::settings::{EnvConfigSource, GatewayConfigSource, GatewaySettings};
use crate::token::{Consumer, Token};
use crate::transport::ServiceTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use std::sync::Arc;
use transport_http::{HttpResponse, HttpTransport};

/// Service reached through the API gateway
///
/// Every dial logs in with the stored credentials first and signs the
/// prepared request with the issued bearer token. Tokens are not cached.
#[derive(Debug)]
pub struct CloudService {
    service: Service,
    credentials: AuthCredentials,
    settings: GatewaySettings,
}

impl CloudService {
    /// Gateway-routed service configured from `SOA_*` environment variables
    ///
    /// # Errors
    /// Returns `TransportError::Config` if the settings cannot be read or the
    /// HTTP client cannot be built.
    pub fn new(target: ServiceTarget, credentials: AuthCredentials) -> Result<Self, TransportError> {
        Self::with_parts(
            target,
            credentials,
            &EnvConfigSource::new(),
            default_http_transport()?,
        )
    }

    /// Gateway-routed service with explicit settings source and transport
    ///
    /// The settings are read once, here.
    ///
    /// # Errors
    /// Returns `TransportError::Config` if the source fails.
    pub fn with_parts(
        target: ServiceTarget,
        credentials: AuthCredentials,
        source: &dyn GatewayConfigSource,
        http: Arc<dyn HttpTransport>,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            service: Service::with_transport(target, http),
            credentials,
            settings: source.load()?,
        })
    }

    #[must_use]
    pub fn target(&self) -> &ServiceTarget {
        self.service.target()
    }

    #[must_use]
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    #[must_use]
    pub fn current_request(&self) -> Option<&PreparedRequest> {
        self.service.current_request()
    }

    #[must_use]
    pub fn effective_name(&self) -> String {
        self.service.effective_name()
    }

    /// Root URL of the API gateway for this request
    ///
    /// The configured override wins. Otherwise the host is
    /// `{gateway_uri}-staging.{domain}` in staging and `{gateway_uri}.{domain}`
    /// elsewhere.
    #[must_use]
    pub fn api_gateway_url(&self, request: &Request) -> String {
        if let Some(url) = self.settings.gateway_url_override() {
            return url.to_owned();
        }

        let target = self.service.target();
        let protocol = request.protocol.resolve(target.protocol);
        let uri = &self.settings.gateway_uri;
        let domain = &self.settings.service_domain;
        if target.environment == STAGING_ENVIRONMENT {
            format!("{protocol}://{uri}-{}.{domain}", target.environment)
        } else {
            format!("{protocol}://{uri}.{domain}")
        }
    }

    /// Log in at the gateway root and return the first issued token
    ///
    /// # Errors
    /// Returns [`AuthError`] describing which step of the login failed.
    pub async fn authenticate(&self, request: &Request) -> Result<Token, AuthError> {
        let url = self.api_gateway_url(request);
        tracing::debug!(service = %self.service.target().name, gateway = %url, "logging in at api gateway");

        let body = serde_json::to_vec(&self.credentials)
            .map_err(|e| AuthError::LoginRequestFailed(format!("cannot encode credentials: {e}")))?;
        let login = http::Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))
            .map_err(|e| AuthError::LoginRequestFailed(format!("cannot build login request: {e}")))?;

        let response = self
            .service
            .http()
            .execute(login)
            .await
            .map_err(|e| AuthError::LoginRequestFailed(format_http_error(&e, "login request")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::LoginRequestFailed(format_http_error(&e, "login response")))?;

        let envelope: ServiceEnvelope = serde_json::from_slice(&body)
            .map_err(|e| AuthError::ResponseDecodeFailed(e.to_string()))?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                return Err(AuthError::LoginUnauthorised { status });
            }
            StatusCode::OK | StatusCode::NOT_MODIFIED => {}
            _ => {
                return Err(AuthError::GatewayLoginFailed {
                    status,
                    message: envelope.message,
                });
            }
        }

        let consumer: Consumer = envelope
            .extract_data(CONSUMER_DATA_TYPE)
            .map_err(AuthError::ConsumerExtractionFailed)?;
        consumer
            .tokens
            .into_iter()
            .next()
            .ok_or(AuthError::ConsumerHasNoTokens)
    }

    fn prepare(&self, request: Request, token: &Token) -> Result<PreparedRequest, TransportError> {
        let target = self.service.target();
        let gateway_url = self.api_gateway_url(&request);
        let base = build_cloud_service_url(&gateway_url, &target.namespace, &target.effective_name());
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
        prepared.insert_secret_header(AUTH_HEADER, &token.prepare_for_http())?;
        if target.version != 0 {
            prepared.insert_header(SERVICE_VERSION_HEADER, &target.version.to_string())?;
        }
        Ok(prepared)
    }
}

#[async_trait]
impl ServiceTransport for CloudService {
    async fn dial(&mut self, request: Request) -> Result<(), TransportError> {
        if self.credentials.is_incomplete() {
            return Err(AuthError::MissingCredentials.into());
        }

        let token = self.authenticate(&request).await?;
        let prepared = self.prepare(request, &token)?;
        tracing::debug!(
            service = %self.service.target().name,
            method = %prepared.method,
            url = %prepared.uri,
            "dialed cloud service"
        );
        self.service.store(prepared);
        Ok(())
    }

    async fn call(&self) -> Result<HttpResponse, TransportError> {
        self.service.send_current().await
    }

    fn name(&self) -> &str {
        &self.service.target().name
    }
}
