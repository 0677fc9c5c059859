//! Configuration surfaces shared by every subcommand
//!
//! Precedence: command-line flag, then environment (including `.env`), then
//! the built-in sample database.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use pgleak_core::{ConnectionDescriptor, DemoConfig, DEFAULT_HOLD, DEFAULT_PORT};

/// Load `.env` files into the environment.
///
/// Priority order (highest to lowest):
/// 1. Variables already set
/// 2. Current directory .env
/// 3. ~/.pgleak/.env
///
/// Runs before tracing is up, so it returns what it loaded for the caller to
/// log.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path);
    }

    if let Some(home_dir) = dirs::home_dir() {
        let env_file = home_dir.join(".pgleak").join(".env");
        // dotenvy doesn't overwrite existing vars, so the cwd file wins
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(env_file);
        }
    }

    loaded_from
}

/// Which database to connect to
#[derive(Args, Debug, Clone)]
pub struct DescriptorArgs {
    /// Database host
    #[arg(long, env = "PGLEAK_HOST", default_value = "db")]
    pub host: String,

    /// Database port
    #[arg(long, env = "PGLEAK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database name
    #[arg(long, env = "PGLEAK_DBNAME", default_value = "coolappdb")]
    pub dbname: String,

    /// Database user
    #[arg(long, env = "PGLEAK_USER", default_value = "thedbuser")]
    pub user: String,

    /// Database password
    #[arg(
        long,
        env = "PGLEAK_PASSWORD",
        default_value = "thepassword",
        hide_default_value = true,
        hide_env_values = true
    )]
    pub password: String,

    /// Full keyword/value connection string (e.g. "host=db dbname=coolappdb");
    /// replaces the individual flags when given
    #[arg(long, env = "PGLEAK_CONNINFO", hide_env_values = true)]
    pub conninfo: Option<String>,
}

impl DescriptorArgs {
    pub fn descriptor(&self) -> Result<ConnectionDescriptor> {
        if let Some(conninfo) = &self.conninfo {
            return conninfo
                .parse()
                .context("Invalid --conninfo / PGLEAK_CONNINFO");
        }

        let descriptor = ConnectionDescriptor::new(
            self.host.as_str(),
            self.dbname.as_str(),
            self.user.as_str(),
            self.password.as_str(),
        )
        .context("Invalid connection descriptor")?;
        Ok(descriptor.with_port(self.port))
    }
}

/// How each invocation behaves
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Never close the connection (the leaky variant)
    #[arg(long)]
    pub leak: bool,

    /// Seconds to hold the connection before closing or abandoning it
    #[arg(long, env = "PGLEAK_HOLD_SECS", default_value_t = DEFAULT_HOLD.as_secs())]
    pub hold_secs: u64,
}

impl DemoArgs {
    pub fn config(&self) -> DemoConfig {
        DemoConfig {
            leak: self.leak,
            hold: Duration::from_secs(self.hold_secs),
        }
    }
}
