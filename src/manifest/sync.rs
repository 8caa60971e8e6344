//! Index synchronization.
//!
//! Keeps the board-manager index consistent with the one archive currently
//! present: hash the archive, rewrite its index entry in place, delete
//! superseded archives, write the index back atomically.
//!
//! The operation is a single idempotent transformation: running it twice
//! with the same archive produces a byte-identical index the second time.
//! The write goes through a temporary file in the index's directory followed
//! by a rename, so a crash mid-write never leaves a truncated document and
//! every failure leaves the previous index bytes untouched.
//!
//! One build at a time is assumed; nothing here locks against concurrent
//! invocations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::artifact::{self, Artifact};
use crate::manifest::{Board, Checksum, Help, Package, PackageIndex, Platform};

/// Synchronization errors.
///
/// Artifact errors are fatal and not worth retrying; write errors are
/// retryable by re-invoking the whole operation, since it is idempotent.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Input archive missing, not a regular file, or empty.
    #[error("artifact not found or empty: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    /// Input archive could not be read.
    #[error("failed to read artifact {}: {source}", .path.display())]
    ArtifactRead { path: PathBuf, source: io::Error },

    /// Input archive name carries no recognizable version.
    #[error("artifact file name {file_name:?} does not match the <package>-<version>.zip pattern")]
    ArtifactName { file_name: String },

    /// Index document could not be read.
    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead { path: PathBuf, source: io::Error },

    /// Index document is not well-formed; the source error names the
    /// offending field and position.
    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Updated index could not be serialized.
    #[error("failed to serialize manifest {}: {source}", .path.display())]
    ManifestEncode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Atomic replace of the index document failed.
    #[error("failed to write manifest {}: {source}", .path.display())]
    ManifestWrite { path: PathBuf, source: io::Error },
}

impl SyncError {
    /// Distinguishing process exit code per error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ArtifactNotFound { .. } | Self::ArtifactRead { .. } | Self::ArtifactName { .. } => 2,
            Self::ManifestRead { .. } | Self::ManifestParse { .. } => 3,
            Self::ManifestEncode { .. } | Self::ManifestWrite { .. } => 4,
        }
    }
}

/// What happens to superseded archives in the artifact directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Keep only the archive just indexed; delete every other version.
    #[default]
    Latest,
    /// Retain all versions (multi-version index entries coexist).
    All,
}

/// Identity of the package being indexed, plus the values used to scaffold
/// index entries that do not exist yet.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    /// Package name in the index (also the platform entry name).
    pub name: String,
    /// File-name prefix of built archives, e.g. `nuttyfi32`.
    pub archive_prefix: String,
    pub maintainer: String,
    pub website_url: String,
    pub email: String,
    pub architecture: String,
    pub category: String,
    /// Board listed on a scaffolded platform entry.
    pub board_name: String,
}

/// Explicit resource handle for one synchronization run.
///
/// Passed into [`Synchronizer::new`] rather than read from process-wide
/// state, so tests can point it at isolated temporary copies.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub package: PackageSpec,
    /// Repository base the release download URL is built from.
    pub download_base: String,
    /// Directory scanned for stale archives. Defaults to the directory of
    /// the archive being indexed.
    pub artifact_dir: Option<PathBuf>,
    pub cleanup: CleanupPolicy,
}

/// Result of a successful synchronization pass.
#[derive(Debug)]
pub struct SyncReport {
    pub version: semver::Version,
    pub size: u64,
    pub checksum: Checksum,
    /// Whether a new platform entry was created (as opposed to rewritten).
    pub created_entry: bool,
    /// Stale archives deleted from the artifact directory.
    pub removed: Vec<PathBuf>,
}

/// Rewrites the board-manager index to describe one freshly built archive.
///
/// The contract, in order:
///
/// 1. Hash the archive (streaming SHA-256) and read its size.
/// 2. Locate the index entry for the package and the archive's version;
///    create it if absent, overwrite `checksum`/`size`/`url` in place if
///    present. Sibling entry order is preserved.
/// 3. Delete every other archive in the artifact directory matching the
///    package naming pattern (unless the cleanup policy retains them).
///    Deletion failures are logged and do not fail the run; a leftover
///    stale file clutters the directory but cannot corrupt the index, and
///    the next run retries the cleanup.
/// 4. Replace the index document atomically.
pub struct Synchronizer {
    settings: SyncSettings,
}

impl Synchronizer {
    /// Creates a synchronizer with the given settings.
    pub fn new(settings: SyncSettings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the synchronizer settings.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Runs one synchronization pass for the archive at `artifact_path`
    /// against the index document at `manifest_path`.
    pub async fn run(
        &self,
        artifact_path: &Path,
        manifest_path: &Path,
    ) -> Result<SyncReport, SyncError> {
        let artifact =
            Artifact::inspect(artifact_path, &self.settings.package.archive_prefix).await?;
        log::debug!(
            "inspected {}: {} bytes, {}",
            artifact.file_name,
            artifact.size,
            artifact.checksum
        );

        let bytes = tokio::fs::read(manifest_path)
            .await
            .map_err(|e| SyncError::ManifestRead {
                path: manifest_path.to_path_buf(),
                source: e,
            })?;
        let mut index = PackageIndex::parse(&bytes).map_err(|e| SyncError::ManifestParse {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;

        let created_entry = self.apply(&mut index, &artifact);
        let removed = self.remove_stale(&artifact).await;
        self.write_atomic(&index, manifest_path).await?;

        Ok(SyncReport {
            version: artifact.version.clone(),
            size: artifact.size,
            checksum: artifact.checksum.clone(),
            created_entry,
            removed,
        })
    }

    /// Rewrites the index entry for `artifact` in place. Returns whether a
    /// new entry was created.
    fn apply(&self, index: &mut PackageIndex, artifact: &Artifact) -> bool {
        let spec = &self.settings.package;

        let pos = match index.packages.iter().position(|p| p.name == spec.name) {
            Some(pos) => pos,
            None => {
                log::info!("package {:?} not in index, creating it", spec.name);
                index.packages.push(self.scaffold_package());
                index.packages.len() - 1
            }
        };
        let package = &mut index.packages[pos];

        let version = artifact.version.to_string();
        let url = self.download_url(artifact);

        match package.platforms.iter().position(|p| p.version == version) {
            Some(pos) => {
                let entry = &mut package.platforms[pos];
                entry.url = url;
                entry.archive_file_name = artifact.file_name.clone();
                entry.checksum = artifact.checksum.clone();
                entry.size = artifact.size;
                false
            }
            None => {
                // Clone the most recent sibling as a template so board lists
                // and tool dependencies carry over to the new version.
                let entry = match package.platforms.last() {
                    Some(template) => {
                        let mut entry = template.clone();
                        entry.version = version;
                        entry.url = url;
                        entry.archive_file_name = artifact.file_name.clone();
                        entry.checksum = artifact.checksum.clone();
                        entry.size = artifact.size;
                        entry
                    }
                    None => self.scaffold_platform(artifact),
                };
                package.platforms.push(entry);
                true
            }
        }
    }

    /// Deletes archives in the artifact directory whose name matches the
    /// package pattern but whose version differs from the one just built.
    ///
    /// Failures here are logged, never fatal; the index remains the source
    /// of truth for consumers and the next run retries the cleanup.
    async fn remove_stale(&self, artifact: &Artifact) -> Vec<PathBuf> {
        let mut removed = Vec::new();

        if self.settings.cleanup == CleanupPolicy::All {
            log::debug!("cleanup policy retains all versions, skipping stale scan");
            return removed;
        }

        let dir = match &self.settings.artifact_dir {
            Some(dir) => dir.clone(),
            None => match artifact.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot scan artifact directory {}: {e}", dir.display());
                return removed;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("error scanning artifact directory {}: {e}", dir.display());
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(version) =
                artifact::parse_archive_version(name, &self.settings.package.archive_prefix)
            else {
                continue;
            };
            if version == artifact.version {
                continue;
            }

            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    log::info!("removed stale archive {}", path.display());
                    removed.push(path);
                }
                Err(e) => {
                    log::warn!("could not remove stale archive {}: {e}", path.display());
                }
            }
        }

        removed
    }

    /// Replaces the index document on disk: serialize, write to a temporary
    /// file in the same directory, rename over the original.
    async fn write_atomic(
        &self,
        index: &PackageIndex,
        manifest_path: &Path,
    ) -> Result<(), SyncError> {
        let bytes = index
            .to_json_bytes()
            .map_err(|e| SyncError::ManifestEncode {
                path: manifest_path.to_path_buf(),
                source: e,
            })?;

        let path = manifest_path.to_path_buf();
        tokio::task::spawn_blocking(move || write_replace(&path, &bytes))
            .await
            .map_err(|e| SyncError::ManifestWrite {
                path: manifest_path.to_path_buf(),
                source: io::Error::other(e),
            })?
    }

    fn download_url(&self, artifact: &Artifact) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.settings.download_base.trim_end_matches('/'),
            artifact.version,
            artifact.file_name
        )
    }

    fn scaffold_package(&self) -> Package {
        let spec = &self.settings.package;
        Package {
            name: spec.name.clone(),
            maintainer: spec.maintainer.clone(),
            website_url: spec.website_url.clone(),
            email: spec.email.clone(),
            help: Help {
                online: spec.website_url.clone(),
            },
            platforms: Vec::new(),
            tools: Vec::new(),
        }
    }

    fn scaffold_platform(&self, artifact: &Artifact) -> Platform {
        let spec = &self.settings.package;
        Platform {
            name: spec.name.clone(),
            architecture: spec.architecture.clone(),
            version: artifact.version.to_string(),
            category: spec.category.clone(),
            url: self.download_url(artifact),
            archive_file_name: artifact.file_name.clone(),
            checksum: artifact.checksum.clone(),
            size: artifact.size,
            help: Help {
                online: spec.website_url.clone(),
            },
            boards: vec![Board {
                name: spec.board_name.clone(),
            }],
            tools_dependencies: Vec::new(),
        }
    }
}

fn write_replace(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source: io::Error| SyncError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map(|_| ()).map_err(|e| write_err(e.error))
}
