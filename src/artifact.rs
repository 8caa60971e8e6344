//! Built archive identity.
//!
//! An [`Artifact`] is one built distributable archive on disk, identified by
//! the `<package>-<version>.zip` naming pattern. Inspection computes the
//! values the index entry must carry: byte size from filesystem metadata and
//! a streaming SHA-256 digest of the full content.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use semver::Version;

use crate::bsp::checksum::sha256_file;
use crate::manifest::Checksum;
use crate::manifest::sync::SyncError;

/// One built archive, hashed and measured.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Location on disk.
    pub path: PathBuf,
    /// Bare file name, e.g. `nuttyfi32-1.0.0.zip`.
    pub file_name: String,
    /// Version embedded in the file name.
    pub version: Version,
    /// Byte size from filesystem metadata.
    pub size: u64,
    /// SHA-256 over the full content.
    pub checksum: Checksum,
}

impl Artifact {
    /// Inspects the archive at `path`, hashing it exactly once.
    ///
    /// Fails with [`SyncError::ArtifactNotFound`] when the path is missing,
    /// not a regular file, or empty, and with [`SyncError::ArtifactName`]
    /// when the file name does not carry a `<prefix>-<version>.zip` version.
    pub async fn inspect(path: &Path, archive_prefix: &str) -> Result<Self, SyncError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SyncError::ArtifactNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SyncError::ArtifactRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() || metadata.len() == 0 {
            return Err(SyncError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SyncError::ArtifactName {
                file_name: path.display().to_string(),
            })?
            .to_string();

        let version =
            parse_archive_version(&file_name, archive_prefix).ok_or_else(|| {
                SyncError::ArtifactName {
                    file_name: file_name.clone(),
                }
            })?;

        let digest = sha256_file(path).await.map_err(|e| SyncError::ArtifactRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            version,
            size: metadata.len(),
            checksum: Checksum::sha256(digest),
        })
    }
}

/// Extracts the semantic version from a `<prefix>-<version>.zip` file name.
///
/// Returns `None` for names outside the pattern, including other packages'
/// archives that happen to share the directory.
pub fn parse_archive_version(file_name: &str, prefix: &str) -> Option<Version> {
    let pattern = Regex::new(&format!(r"^{}-(.+)\.zip$", regex::escape(prefix))).ok()?;
    let captures = pattern.captures(file_name)?;
    Version::parse(captures.get(1)?.as_str()).ok()
}
