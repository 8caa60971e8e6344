//! Vendor archive extraction.
//!
//! Unpacks the upstream release ZIP into a scratch directory and normalizes
//! the result to a single root folder, the layout the Arduino IDE expects
//! inside a BSP archive.

use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{CliError, Result};

/// Extracts a ZIP archive into `dest`.
pub async fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&archive)?;
        let mut zip = ZipArchive::new(file)?;
        log::debug!(
            "extracting {} ({} entries) to {}",
            archive.display(),
            zip.len(),
            dest.display()
        );
        zip.extract(&dest)?;
        Ok(())
    })
    .await
    .map_err(|e| anyhow::anyhow!("extraction task panicked: {e}"))?
}

/// Normalizes an extraction directory to a single root folder.
///
/// A lone top-level directory is used directly. Anything else (multiple
/// folders, loose files, or a mix) gets wrapped under a new `root_name`
/// folder, since release ZIPs are not consistent about their layout.
pub async fn normalize_root(dir: &Path, root_name: &str) -> Result<PathBuf> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = reader.next_entry().await? {
        entries.push((entry.path(), entry.file_name()));
    }

    if entries.is_empty() {
        return Err(CliError::InvalidArguments {
            reason: format!("extracted archive is empty: {}", dir.display()),
        }
        .into());
    }

    if entries.len() == 1 {
        let (path, _) = &entries[0];
        if tokio::fs::metadata(path).await?.is_dir() {
            return Ok(path.clone());
        }
    }

    let wrapper = dir.join(root_name);
    tokio::fs::create_dir(&wrapper).await?;
    for (path, name) in &entries {
        tokio::fs::rename(path, wrapper.join(name)).await?;
    }
    log::info!(
        "wrapped {} top-level entries under {}/",
        entries.len(),
        root_name
    );

    Ok(wrapper)
}
