//! pgleak CLI - PostgreSQL connection leak demonstrator
//!
//! - `run`: open a connection, hold it, close it (or with `--leak`, don't)
//! - `serve`: the same, once per HTTP request (with `server` feature)
//! - `sessions`: count the sessions currently held on the database

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pgleak",
    author,
    version,
    about = "Open a PostgreSQL connection, hold it, and optionally never give it back",
    long_about = "Demonstrates a database connection leak. Each invocation opens one session, \
                  holds it for a fixed interval, then closes it, or with --leak abandons it. \
                  Repeated leaky invocations pile up sessions on the server."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the demonstrator, printing status lines to stdout
    Run(commands::run::RunArgs),
    /// Run an HTTP server that invokes the demonstrator once per request
    #[cfg(feature = "server")]
    Serve(commands::serve::ServeArgs),
    /// Count other sessions connected to the database
    Sessions(commands::sessions::SessionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug })?;
    for path in &env_files {
        tracing::debug!("Loaded .env from {}", path.display());
    }

    match cli.command {
        Commands::Run(args) => commands::run_invocations(args).await,
        #[cfg(feature = "server")]
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Sessions(args) => commands::run_sessions(args).await,
    }
}
