use clap::{Args, Parser, Subcommand};
use microservice_transport::constants::DEFAULT_SERVICE_BRANCH;
use microservice_transport::{Protocol, Request, ServiceTarget};
use std::time::Duration;

/// Call a fleet service and print the response
#[derive(Parser, Debug)]
#[command(name = "svc-call")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reach the service through its in-cluster DNS name
    Direct(CallArgs),
    /// Reach the service through the API gateway (SOA_GATEWAY_URL, SOA_GATEWAY_URI, SOA_DOMAIN)
    Cloud {
        #[command(flatten)]
        call: CallArgs,

        /// Gateway login email
        #[arg(long, env = "SOA_EMAIL", default_value = "")]
        email: String,

        /// Gateway login password
        #[arg(long, env = "SOA_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Service name
    #[arg(long)]
    pub name: String,

    /// Namespace the service is deployed in
    #[arg(long)]
    pub namespace: String,

    /// Deployment environment (e.g. staging, live)
    #[arg(long)]
    pub environment: String,

    #[arg(long, default_value = DEFAULT_SERVICE_BRANCH)]
    pub branch: String,

    /// Major version, 0 for unversioned
    #[arg(long, default_value_t = 0)]
    pub version: u32,

    /// `http` or `https`; anything else means https
    #[arg(long)]
    pub protocol: Option<String>,

    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Resource path below the service root
    #[arg(long, default_value = "")]
    pub resource: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_key_value, action = clap::ArgAction::Append)]
    pub query: Vec<(String, String)>,

    /// Header as key=value (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_key_value, action = clap::ArgAction::Append)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl CallArgs {
    pub fn target(&self) -> ServiceTarget {
        let target = ServiceTarget::new(
            self.branch.as_str(),
            self.environment.as_str(),
            self.namespace.as_str(),
            self.name.as_str(),
        )
        .with_version(self.version);
        match &self.protocol {
            Some(token) => target.with_protocol(Protocol::from_token(token)),
            None => target,
        }
    }

    pub fn request(&self) -> anyhow::Result<Request> {
        let method = http::Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid method '{}': {e}", self.method))?;
        let mut request = Request::new(method, self.resource.trim_start_matches('/'));
        for (key, value) in &self.query {
            request = request.with_query(key.as_str(), value.as_str());
        }
        for (name, value) in &self.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(data) = &self.data {
            request = request.with_body(data.clone());
        }
        Ok(request)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("foo=bar=baz").unwrap(),
            ("foo".to_owned(), "bar=baz".to_owned())
        );
        assert_eq!(parse_key_value("empty=").unwrap(), ("empty".to_owned(), String::new()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_direct_args() {
        let cli = Cli::parse_from([
            "svc-call", "-v", "direct", "--name", "orders", "--namespace", "shop",
            "--environment", "staging", "--version", "2", "--protocol", "http",
            "-X", "post", "--resource", "/orders", "-q", "page=2", "-q", "page=3",
            "-H", "x-request-id=abc", "-d", "{}",
        ]);
        assert_eq!(cli.verbose, 1);
        let Command::Direct(args) = cli.command else {
            panic!("expected direct subcommand");
        };

        let target = args.target();
        assert_eq!(target.branch, "master");
        assert_eq!(target.version, 2);
        assert_eq!(target.protocol, Protocol::Http);
        assert_eq!(target.dns_name(), "orders-master-staging.orders-2");

        let request = args.request().unwrap();
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(request.resource, "orders");
        assert_eq!(request.encoded_query().unwrap(), "page=2&page=3");
        assert_eq!(request.headers.get("x-request-id").map(String::as_str), Some("abc"));
        assert_eq!(request.body.as_deref(), Some(b"{}".as_slice()));
    }

    #[test]
    fn test_cloud_args() {
        let cli = Cli::parse_from([
            "svc-call", "cloud", "--name", "basket", "--namespace", "aggregators",
            "--environment", "live", "--email", "svc@example.com", "--password", "pw",
        ]);
        let Command::Cloud { call, email, password } = cli.command else {
            panic!("expected cloud subcommand");
        };
        assert_eq!(email, "svc@example.com");
        assert_eq!(password, "pw");
        assert_eq!(call.target().effective_name(), "agg-basket");
        assert_eq!(call.target().protocol, Protocol::Unspecified);
        assert_eq!(call.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_method() {
        let cli = Cli::parse_from([
            "svc-call", "direct", "--name", "a", "--namespace", "b", "--environment", "c",
            "-X", "BAD METHOD",
        ]);
        let Command::Direct(args) = cli.command else {
            panic!("expected direct subcommand");
        };
        assert!(args.request().is_err());
    }
}
