//! Connector construction for the HTTP client.
//!
//! Native root certificates are loaded once per process; OS store lookups are
//! slow on some platforms.

use crate::config::{TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use rustls_pki_types::CertificateDer;
use std::sync::{Arc, OnceLock};

/// Empty vec means no certs were found (warned, not errored).
static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

fn native_root_certs() -> &'static [CertificateDer<'static>] {
    NATIVE_ROOTS.get_or_init(|| {
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            tracing::warn!(error = %err, "error loading native root certificate");
        }
        if result.certs.is_empty() {
            tracing::warn!("no native root CA certificates found");
        } else {
            tracing::debug!(count = result.certs.len(), "loaded native root certificates");
        }
        result.certs
    })
}

/// Returns the process-wide default provider if one is installed,
/// otherwise a fresh aws-lc-rs provider (not installed globally).
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn native_roots_client_config() -> Result<rustls::ClientConfig, HttpError> {
    let certs = native_root_certs();
    if certs.is_empty() {
        return Err(HttpError::Tls(
            "no native root CA certificates found in OS certificate store".into(),
        ));
    }

    let mut root_store = rustls::RootCertStore::empty();
    let (added, ignored) = root_store.add_parsable_certificates(certs.iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "some native root certificates could not be parsed");
    }
    if added == 0 {
        return Err(HttpError::Tls(
            format!("none of the {} native root certificates could be parsed", certs.len()).into(),
        ));
    }

    let config = rustls::ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| HttpError::Tls(Box::new(e)))?
        .with_root_certificates(root_store)
        .with_no_client_auth();
    Ok(config)
}

/// Build the connector used by the pooled hyper client
///
/// ALPN advertises both h2 and http/1.1. Plain `http://` connections are
/// only possible with [`TransportSecurity::AllowInsecureHttp`].
///
/// # Errors
/// Returns `HttpError::Tls` when the root store cannot be assembled.
pub(crate) fn build_https_connector(
    tls_roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match tls_roots {
        TlsRootConfig::WebPki => hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(native_roots_client_config()?),
    };

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => builder.https_or_http().enable_all_versions().build(),
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}
