//! Host and URL naming rules for fleet services.
//!
//! Inputs are joined verbatim. No validation or escaping happens here; the
//! HTTP layer rejects anything that does not form a valid URL.

/// In-cluster DNS name: `{service}-{branch}-{environment}.{namespace}`
#[must_use]
pub fn build_service_dns_name(
    service: &str,
    branch: &str,
    environment: &str,
    namespace: &str,
) -> String {
    format!("{service}-{branch}-{environment}.{namespace}")
}

/// Gateway route to a service: `{gateway_url}/{namespace}/{name}`
#[must_use]
pub fn build_cloud_service_url(gateway_url: &str, namespace: &str, name: &str) -> String {
    format!("{gateway_url}/{namespace}/{name}")
}
