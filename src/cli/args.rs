//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! and the runtime configuration handed to commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BSP repackager and board-manager index synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "nuttyfi32_bsp_release",
    version,
    about = "Repackages the Arduino ESP32 BSP as nuttyfi32 and keeps the board-manager index in sync",
    long_about = "Repackages the Arduino ESP32 BSP as nuttyfi32 and keeps the board-manager index in sync.

Usage:
  nuttyfi32_bsp_release bundle --source esp32-1.0.6.zip --bsp-version 1.0.0 --manifest package_nuttyfi32_index.json
  nuttyfi32_bsp_release sync --artifact nuttyfi32-1.0.0.zip --manifest package_nuttyfi32_index.json
  nuttyfi32_bsp_release push --repo .

Exit codes for sync failures: 2 = artifact missing or unusable,
3 = index unreadable or unparseable, 4 = index write failed, 1 = anything else."
)]
pub struct Args {
    /// Configuration file (defaults to packager.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output; errors still go to stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the nuttyfi32 archive from a vendor BSP source and synchronize the index
    Bundle(BundleArgs),
    /// Synchronize the board-manager index with a freshly built archive
    Sync(SyncArgs),
    /// Commit and push the BSP tree and index with the external git client
    Push(PushArgs),
}

#[derive(clap::Args, Debug)]
pub struct BundleArgs {
    /// Vendor BSP source: an upstream release .zip or an extracted tree
    #[arg(short, long, value_name = "SOURCE")]
    pub source: String,

    /// Version for the built archive
    #[arg(long = "bsp-version", value_name = "SEMVER")]
    pub version: semver::Version,

    /// Directory the built archive lands in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Board-manager index to synchronize
    #[arg(short, long, value_name = "PATH")]
    pub manifest: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Freshly built archive to index
    #[arg(short, long, value_name = "PATH")]
    pub artifact: PathBuf,

    /// Board-manager index document to rewrite
    #[arg(short, long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Directory scanned for stale archives (defaults to the artifact's directory)
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Keep superseded archives instead of deleting them
    #[arg(long)]
    pub keep_stale: bool,
}

#[derive(clap::Args, Debug)]
pub struct PushArgs {
    /// Git repository holding the BSP tree and index
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Branch to push (overrides configuration)
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Version stamped into the commit message
    #[arg(long = "bsp-version", value_name = "SEMVER")]
    pub version: Option<semver::Version>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Bundle(bundle) => {
                if bundle.source.is_empty() {
                    return Err("Source cannot be empty".to_string());
                }
            }
            Command::Sync(sync) => {
                if sync.artifact.file_name().is_none() {
                    return Err(format!(
                        "Artifact path has no file name: {}",
                        sync.artifact.display()
                    ));
                }
            }
            Command::Push(_) => {}
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(
            true, // Always verbose
            args.quiet,
        );

        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }
}
