//! Full packaging pipeline: stage the vendor BSP, rebrand it, zip it,
//! synchronize the board-manager index.

use std::path::Path;

use uuid::Uuid;

use crate::bsp;
use crate::cli::{BundleArgs, RuntimeConfig};
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::manifest::sync::Synchronizer;
use crate::source::BspSource;

pub async fn run(
    args: &BundleArgs,
    config: &PackagerConfig,
    runtime: &RuntimeConfig,
) -> Result<()> {
    let source = BspSource::parse(&args.source)?;

    let work_dir = std::env::temp_dir().join(format!("nuttyfi32-bundle-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&work_dir).await?;

    let result = build(args, config, runtime, &source, &work_dir).await;

    // Scratch space goes away on success and failure alike.
    if let Err(e) = bsp::fs::remove_dir_all(&work_dir).await {
        log::warn!(
            "failed to clean up work directory {}: {e}",
            work_dir.display()
        );
    }

    result
}

async fn build(
    args: &BundleArgs,
    config: &PackagerConfig,
    runtime: &RuntimeConfig,
    source: &BspSource,
    work_dir: &Path,
) -> Result<()> {
    runtime.section(&format!(
        "Bundling {} v{}",
        config.package.name, args.version
    ))?;

    runtime.progress("Staging BSP source")?;
    let tree = source
        .stage(work_dir, &config.package.archive_prefix)
        .await?;
    runtime.verbose_println(&format!("  staged at {}", tree.display()))?;

    runtime.progress("Applying esp32 -> nuttyfi32 renames")?;
    let rebrand = bsp::rebrand::rebrand_tree(&tree).await?;
    runtime.verbose_println(&format!(
        "  index template renamed: {}, platform.txt updated: {}, boards.txt updated: {}",
        rebrand.renamed_template, rebrand.platform_updated, rebrand.boards_updated
    ))?;

    let archive_name = format!("{}-{}.zip", config.package.archive_prefix, args.version);
    let output = args.output_dir.join(&archive_name);
    tokio::fs::create_dir_all(&args.output_dir).await?;

    runtime.progress(&format!("Creating {archive_name}"))?;
    let file_count = bsp::archive::create_archive(&tree, &output).await?;
    runtime.verbose_println(&format!("  {file_count} files archived"))?;

    runtime.progress("Synchronizing board-manager index")?;
    let synchronizer = Synchronizer::new(config.sync_settings());
    let report = synchronizer.run(&output, &args.manifest).await?;
    for removed in &report.removed {
        runtime.verbose_println(&format!("  removed stale archive {}", removed.display()))?;
    }

    runtime.success(&format!(
        "Bundled {archive_name}: {} bytes, {}",
        report.size, report.checksum
    ))?;
    runtime.success(&format!("Index updated: {}", args.manifest.display()))?;

    Ok(())
}
