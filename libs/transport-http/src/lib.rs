#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client used by fleet services to reach each other.
//!
//! This crate provides a hyper-based HTTP client with:
//! - TLS via rustls (HTTPS only unless insecure HTTP is enabled)
//! - Connection pooling
//! - A fixed per-request timeout (5 seconds by default)
//! - User-Agent header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//! - Redirect following with a hop limit
//!
//! Requests are never retried. The client returns `Ok` for every HTTP status;
//! only transport, TLS, and timeout failures are errors.
//!
//! Services depend on the [`HttpTransport`] capability rather than on
//! [`HttpClient`] directly, so tests can substitute a recording double.
//!
//! # Example
//!
//! ```ignore
//! use transport_http::{HttpClient, HttpTransport};
//!
//! let client = HttpClient::builder()
//!     .user_agent("orders/1.4")
//!     .build()?;
//!
//! let login = http::Request::post("https://api-gateway.example.com")
//!     .header("content-type", "application/json")
//!     .body(bytes::Bytes::from(r#"{"email":"svc@example.com","password":"secret"}"#))?;
//! let response = client.execute(login).await?;
//! let body = response.bytes().await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod response;
mod tls;
mod transport;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_MAX_REDIRECTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, HttpClientConfig,
    TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{UserAgentLayer, UserAgentService};
pub use response::{HttpResponse, ResponseBody};
pub use transport::HttpTransport;
