//! BSP source resolution

use std::path::{Path, PathBuf};

use crate::bsp;
use crate::error::{CliError, Result};

/// Where the vendor BSP comes from: an upstream release archive or an
/// already-extracted tree.
pub enum BspSource {
    Archive(PathBuf),
    Tree(PathBuf),
}

impl BspSource {
    /// Classifies the `--source` argument. The path must exist and be
    /// either a `.zip` archive or a directory.
    pub fn parse(source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "Source cannot be empty".to_string(),
            }
            .into());
        }

        let path = PathBuf::from(source);
        if !path.exists() {
            return Err(CliError::InvalidArguments {
                reason: format!("Source does not exist: {}", path.display()),
            }
            .into());
        }

        if path.is_dir() {
            return Ok(Self::Tree(path));
        }

        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip {
            Ok(Self::Archive(path))
        } else {
            Err(CliError::InvalidArguments {
                reason: format!(
                    "Source must be a .zip archive or a directory: {}",
                    path.display()
                ),
            }
            .into())
        }
    }

    /// Stages the BSP under `work_dir` and returns the tree root to operate
    /// on. Archives are extracted and normalized to a single root folder;
    /// trees are copied so the original stays untouched.
    pub async fn stage(&self, work_dir: &Path, root_name: &str) -> Result<PathBuf> {
        match self {
            Self::Archive(path) => {
                bsp::extract::extract_archive(path, work_dir).await?;
                bsp::extract::normalize_root(work_dir, root_name).await
            }
            Self::Tree(path) => {
                let dest = work_dir.join(root_name);
                bsp::fs::copy_dir(path, &dest).await?;
                Ok(dest)
            }
        }
    }
}
