//! Command-line client for fleet services.
//!
//! # Usage
//!
//! ```bash
//! # Direct, in-cluster call
//! svc-call direct --name orders --namespace shop --environment staging --resource orders -q page=2
//!
//! # Through the API gateway
//! SOA_GATEWAY_URI=api-gateway SOA_DOMAIN=example.com SOA_EMAIL=svc@example.com SOA_PASSWORD=... \
//!     svc-call cloud --name orders --namespace shop --environment live --resource orders
//! ```

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use microservice_transport::{
    AuthCredentials, CloudService, EnvConfigSource, Service, ServiceTransport,
};
use std::process::ExitCode;
use std::sync::Arc;
use transport_http::{HttpClientBuilder, HttpClientConfig, HttpTransport};

use crate::args::{CallArgs, Cli, Command};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn http_transport(args: &CallArgs) -> Result<Arc<dyn HttpTransport>> {
    let client = HttpClientBuilder::with_config(HttpClientConfig::in_cluster())
        .timeout(args.timeout())
        .build()
        .context("cannot build HTTP client")?;
    Ok(Arc::new(client))
}

async fn run(command: &Command) -> Result<bool> {
    let mut service: Box<dyn ServiceTransport> = match command {
        Command::Direct(call) => Box::new(Service::with_transport(
            call.target(),
            http_transport(call)?,
        )),
        Command::Cloud {
            call,
            email,
            password,
        } => Box::new(CloudService::with_parts(
            call.target(),
            AuthCredentials::new(email.as_str(), password.as_str()),
            &EnvConfigSource::new(),
            http_transport(call)?,
        )?),
    };
    let call = match command {
        Command::Direct(call) | Command::Cloud { call, .. } => call,
    };

    service.dial(call.request()?).await?;
    tracing::info!(service = service.name(), "dialed");

    let response = service.call().await?;
    let status = response.status();
    let body = response.text().await.context("cannot read response body")?;

    println!("{status}");
    if !body.is_empty() {
        println!("{body}");
    }
    Ok(status.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
