//! `pgleak serve` - one invocation per HTTP request

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use pgleak_core::PgConnector;
use pgleak_server::{run_server, AppState, ServerConfig};

use crate::config::{DemoArgs, DescriptorArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "PGLEAK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub descriptor: DescriptorArgs,

    /// Variant and hold used by `GET /`
    #[command(flatten)]
    pub demo: DemoArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let descriptor = args.descriptor.descriptor()?;
    tracing::info!("Starting pgleak server on {}", args.bind);

    let state = AppState {
        connector: PgConnector,
        descriptor,
        demo: args.demo.config(),
    };
    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
