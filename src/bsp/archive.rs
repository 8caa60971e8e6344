//! BSP archive creation.
//!
//! Zips the rebranded tree with every entry under a single root folder
//! (required by the Arduino IDE) and deflate compression. Hidden files and
//! directories are left out, matching what the published archives have
//! always contained.

use std::path::{Component, Path};

use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::{CliError, Result};

/// Creates `output` from the tree rooted at `source_dir`.
///
/// The archive's single root folder takes the name of `source_dir`. A
/// pre-existing file at `output` is replaced. Returns the number of files
/// written.
pub async fn create_archive(source_dir: &Path, output: &Path) -> Result<usize> {
    let root_name = source_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidArguments {
            reason: format!("source directory has no usable name: {}", source_dir.display()),
        })?
        .to_string();

    match tokio::fs::remove_file(output).await {
        Ok(()) => log::debug!("replaced previous archive {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let source = source_dir.to_path_buf();
    let output = output.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<usize> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&source)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        // Sort for a deterministic entry order, so identical trees produce
        // identical archives.
        files.sort();

        let file = std::fs::File::create(&output)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in &files {
            let rel = path
                .strip_prefix(&source)
                .map_err(std::io::Error::other)?;
            let mut arcname = root_name.clone();
            for component in rel.components() {
                if let Component::Normal(part) = component {
                    arcname.push('/');
                    arcname.push_str(&part.to_string_lossy());
                }
            }

            zip.start_file(arcname, options)?;
            let mut reader = std::fs::File::open(path)?;
            std::io::copy(&mut reader, &mut zip)?;
        }

        zip.finish()?;
        log::info!("created {} ({} files)", output.display(), files.len());
        Ok(files.len())
    })
    .await
    .map_err(|e| anyhow::anyhow!("archive task panicked: {e}"))?
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
