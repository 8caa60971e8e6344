//! Command line interface for the nuttyfi32 packager.
//!
//! Argument parsing, command dispatch, and the error-to-exit-code mapping
//! the wrapper scripts rely on.

mod args;
pub mod commands;
mod output;

pub use args::{Args, BundleArgs, Command, PushArgs, RuntimeConfig, SyncArgs};
pub use output::OutputManager;

use crate::config::PackagerConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    if let Err(reason) = args.validate() {
        eprintln!("Error: {reason}");
        return Ok(2);
    }
    let runtime = RuntimeConfig::from(&args);

    match execute(&args, &runtime).await {
        Ok(()) => Ok(0),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(e.exit_code())
        }
    }
}

async fn execute(args: &Args, runtime: &RuntimeConfig) -> Result<()> {
    let config = PackagerConfig::load(args.config.as_deref()).await?;

    match &args.command {
        Command::Bundle(bundle) => commands::bundle::run(bundle, &config, runtime).await,
        Command::Sync(sync) => commands::sync::run(sync, &config, runtime).await,
        Command::Push(push) => commands::push::run(push, &config, runtime).await,
    }
}
