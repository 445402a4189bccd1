//! Header names, protocol tokens and naming conventions shared by the fleet.

use std::time::Duration;

/// Header carrying the bearer token on gateway calls
pub const AUTH_HEADER: &str = "Authorization";

/// Prefix placed in front of the token value, separator included
pub const AUTH_HEADER_PREFIX: &str = "Bearer ";

/// Protocol token for plain connections
pub const PROTOCOL_HTTP: &str = "http";

/// Protocol token for TLS connections
pub const PROTOCOL_HTTPS: &str = "https";

/// Header carrying the major version of the target service
pub const SERVICE_VERSION_HEADER: &str = "x-service-version";

/// Namespace whose services get the aggregator prefix
pub const AGGREGATOR_NAMESPACE: &str = "aggregators";

/// Prefix joined with `-` in front of aggregator service names
pub const AGGREGATOR_DOMAIN_PREFIX: &str = "agg";

/// Environment that gets its own gateway host (`{uri}-staging.{domain}`)
pub const STAGING_ENVIRONMENT: &str = "staging";

/// Envelope data type holding the login consumer
pub const CONSUMER_DATA_TYPE: &str = "consumer";

/// Default VCS branch for services
pub const DEFAULT_SERVICE_BRANCH: &str = "master";

/// Default timeout for a single outbound call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = transport_http::DEFAULT_REQUEST_TIMEOUT;
