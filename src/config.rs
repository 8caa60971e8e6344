//! Packager configuration.
//!
//! Optional `packager.toml` next to the working directory; every field has a
//! default matching the published nuttyfi32 repository, so the tool runs
//! with no configuration at all. CLI flags override file values.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{CliError, Result};
use crate::manifest::sync::{CleanupPolicy, PackageSpec, SyncSettings};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "packager.toml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    pub package: PackageConfig,
    pub sync: SyncConfig,
    pub publish: PublishConfig,
}

/// `[package]`: identity of the repackaged BSP and the values used to
/// scaffold index entries that do not exist yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: String,
    pub archive_prefix: String,
    pub maintainer: String,
    pub website_url: String,
    pub email: String,
    pub architecture: String,
    pub category: String,
    pub board_name: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "nuttyfi32".to_string(),
            archive_prefix: "nuttyfi32".to_string(),
            maintainer: "Community".to_string(),
            website_url: "https://github.com/itsbhupendrasingh/nuttyfi32".to_string(),
            email: "itsbhupendrasingh@gmail.com".to_string(),
            architecture: "esp32".to_string(),
            category: "ESP32".to_string(),
            board_name: "nuttyfi32 Dev Module".to_string(),
        }
    }
}

/// `[sync]`: index synchronization knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Repository base the release download URL is built from.
    pub download_base: String,
    /// `latest` deletes superseded archives; `all` retains every version.
    pub cleanup: CleanupPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_base: "https://github.com/itsbhupendrasingh/nuttyfi32".to_string(),
            cleanup: CleanupPolicy::Latest,
        }
    }
}

/// `[publish]`: where the push step sends the tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub remote: String,
    pub branch: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "Master".to_string(),
        }
    }
}

impl PackagerConfig {
    /// Loads the configuration: an explicit `--config` path must exist and
    /// parse; the implicit `packager.toml` is optional.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = match path {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    CliError::InvalidArguments {
                        reason: format!("cannot read config {}: {e}", path.display()),
                    }
                })?;
                toml::from_str(&text)?
            }
            None => match tokio::fs::read_to_string(DEFAULT_CONFIG_FILE).await {
                Ok(text) => toml::from_str(&text)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(e.into()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.sync.download_base).map_err(|e| CliError::InvalidArguments {
            reason: format!(
                "invalid sync.download_base {:?}: {e}",
                self.sync.download_base
            ),
        })?;
        Ok(())
    }

    /// Synchronizer settings derived from this configuration.
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            package: PackageSpec {
                name: self.package.name.clone(),
                archive_prefix: self.package.archive_prefix.clone(),
                maintainer: self.package.maintainer.clone(),
                website_url: self.package.website_url.clone(),
                email: self.package.email.clone(),
                architecture: self.package.architecture.clone(),
                category: self.package.category.clone(),
                board_name: self.package.board_name.clone(),
            },
            download_base: self.sync.download_base.clone(),
            artifact_dir: None,
            cleanup: self.sync.cleanup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_published_package() {
        let config = PackagerConfig::default();
        assert_eq!(config.package.name, "nuttyfi32");
        assert_eq!(config.package.architecture, "esp32");
        assert_eq!(config.publish.branch, "Master");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let config: PackagerConfig = toml::from_str(
            r#"
            [package]
            name = "myboard"

            [sync]
            cleanup = "all"
            "#,
        )
        .unwrap();

        assert_eq!(config.package.name, "myboard");
        assert_eq!(config.package.architecture, "esp32");
        assert_eq!(config.sync.cleanup, CleanupPolicy::All);
        assert_eq!(config.publish.remote, "origin");
    }

    #[test]
    fn bad_download_base_is_rejected() {
        let config: PackagerConfig = toml::from_str(
            r#"
            [sync]
            download_base = "not a url"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }
}
