//! `pgleak run` - invoke the demonstrator from the command line

use anyhow::{bail, Result};
use clap::Parser;
use pgleak_core::{Demonstrator, PgConnector, TracingLog, WriterSink};

use crate::config::{DemoArgs, DescriptorArgs};

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,

    #[command(flatten)]
    pub demo: DemoArgs,

    /// Number of invocations to run, one after another
    #[arg(long, short = 'n', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,
}

/// Run `count` invocations, writing status lines to stdout.
///
/// Fails after the last invocation if any of them could not connect.
pub async fn run_invocations(args: RunArgs) -> Result<()> {
    let descriptor = args.descriptor.descriptor()?;
    let demo = Demonstrator::new(PgConnector, args.demo.config());
    let mut out = WriterSink::new(std::io::stdout());

    let mut failed = 0u32;
    for invocation in 1..=args.count {
        tracing::debug!(invocation, of = args.count, "Starting invocation");
        if !demo.run(&descriptor, &mut out, &TracingLog).await.is_connected() {
            failed += 1;
        }
    }

    let connected = args.count - failed;
    if demo.config().leak && connected > 0 {
        tracing::warn!(
            sessions = connected,
            "Leaked sessions stay open until this process exits"
        );
    }

    if failed > 0 {
        bail!("{} of {} invocation(s) could not connect", failed, args.count);
    }
    Ok(())
}
