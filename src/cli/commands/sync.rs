//! Standalone index synchronization against an already-built archive.

use crate::cli::{RuntimeConfig, SyncArgs};
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::manifest::sync::{CleanupPolicy, Synchronizer};

pub async fn run(args: &SyncArgs, config: &PackagerConfig, runtime: &RuntimeConfig) -> Result<()> {
    let mut settings = config.sync_settings();
    settings.artifact_dir = args.artifact_dir.clone();
    if args.keep_stale {
        settings.cleanup = CleanupPolicy::All;
    }

    runtime.progress(&format!(
        "Synchronizing {} with {}",
        args.manifest.display(),
        args.artifact.display()
    ))?;

    let synchronizer = Synchronizer::new(settings);
    let report = synchronizer.run(&args.artifact, &args.manifest).await?;

    if report.created_entry {
        runtime.verbose_println(&format!("  added index entry for version {}", report.version))?;
    } else {
        runtime.verbose_println(&format!(
            "  rewrote index entry for version {}",
            report.version
        ))?;
    }
    for removed in &report.removed {
        runtime.verbose_println(&format!("  removed stale archive {}", removed.display()))?;
    }

    runtime.success(&format!(
        "Index entry {}: {} bytes, {}",
        report.version, report.size, report.checksum
    ))?;

    Ok(())
}
