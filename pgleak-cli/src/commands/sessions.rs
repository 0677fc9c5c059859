//! `pgleak sessions` - how many other sessions hold the database

use anyhow::{Context, Result};
use clap::Parser;
use pgleak_core::count_sessions;

use crate::config::DescriptorArgs;

/// Arguments for the sessions command
#[derive(Parser, Debug)]
pub struct SessionsArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,
}

/// Print the session count to stdout
pub async fn run_sessions(args: SessionsArgs) -> Result<()> {
    let descriptor = args.descriptor.descriptor()?;
    let count = count_sessions(&descriptor)
        .await
        .with_context(|| format!("Failed to count sessions on {}", descriptor))?;

    println!("{}", count);
    Ok(())
}
