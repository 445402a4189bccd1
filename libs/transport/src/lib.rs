#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Addressing and transport for calls between fleet services.
//!
//! Two flavours of [`ServiceTransport`]:
//! - [`Service`] reaches a service directly through its in-cluster DNS name
//!   `{name}-{branch}-{environment}.{namespace}`.
//! - [`CloudService`] goes through the API gateway. Each dial logs in with the
//!   configured credentials and signs the request with the issued bearer token.
//!
//! A dial prepares and stores one request; `call` sends it. Both services send
//! through an injected [`HttpTransport`], by default a shared
//! [`transport_http::HttpClient`].
//!
//! ```ignore
//! use microservice_transport::{AuthCredentials, CloudService, Request, ServiceTarget, ServiceTransport};
//!
//! let target = ServiceTarget::new("master", "staging", "services", "orders").with_version(2);
//! let mut orders = CloudService::new(target, AuthCredentials::new(email, password))?;
//! orders.dial(Request::new(http::Method::GET, "things").with_query("page", "2")).await?;
//! let body = orders.call().await?.bytes().await?;
//! ```

mod cloud;
pub mod constants;
mod credentials;
pub mod domain;
mod envelope;
mod error;
mod request;
mod service;
mod settings;
mod token;
mod transport;

#[cfg(test)]
mod testing;

pub use cloud::CloudService;
pub use credentials::{AuthCredentials, SecretString};
pub use domain::{build_cloud_service_url, build_service_dns_name};
pub use envelope::{EnvelopeData, EnvelopeError, ServiceEnvelope};
pub use error::{AuthError, TransportError, format_http_error};
pub use request::{Protocol, Request};
pub use service::{PreparedRequest, Service, ServiceTarget};
pub use settings::{ENV_PREFIX, EnvConfigSource, GatewayConfigSource, GatewaySettings};
pub use token::{Consumer, Token};
pub use transport::ServiceTransport;

pub use transport_http::{HttpClient, HttpClientConfig, HttpError, HttpResponse, HttpTransport};
