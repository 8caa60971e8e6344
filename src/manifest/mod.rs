//! Board-manager package index model.
//!
//! Serde model for the Arduino board-manager index
//! (`package_nuttyfi32_index.json`). Field names on the wire
//! (`websiteURL`, `archiveFileName`, `toolsDependencies`, ...) and the
//! `ALGO:hexdigest` checksum format are contractual: the document is consumed
//! by the IDE's package-index fetcher and must round-trip without loss.
//!
//! The index is always read and rewritten as a whole document; ordered
//! collections are plain `Vec`s so sibling order survives a rewrite.

pub mod sync;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageIndex {
    pub packages: Vec<Package>,
}

impl PackageIndex {
    /// Parses an index document from raw JSON bytes.
    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serializes the index as pretty-printed JSON, two-space indented,
    /// the layout the published index has always used, so rewrites diff
    /// cleanly under source control.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Mutable access to the package with the given name.
    pub fn package_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|p| p.name == name)
    }
}

/// One vendor entry in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub maintainer: String,
    #[serde(rename = "websiteURL", default)]
    pub website_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub help: Help,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Package {
    /// Mutable access to the platform entry for the given version string.
    pub fn platform_mut(&mut self, version: &str) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.version == version)
    }
}

/// Help link block attached to packages, platforms and tools.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Help {
    #[serde(default)]
    pub online: String,
}

/// One downloadable platform version. This is the record the synchronizer
/// rewrites: `checksum` and `size` must always equal the archive the `url`
/// points to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    pub architecture: String,
    pub version: String,
    #[serde(default)]
    pub category: String,
    pub url: String,
    pub archive_file_name: String,
    pub checksum: Checksum,
    #[serde(with = "size_string")]
    pub size: u64,
    #[serde(default)]
    pub help: Help,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub tools_dependencies: Vec<ToolDependency>,
}

/// Board listed under a platform entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
}

/// Reference from a platform to a tool it needs at install time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDependency {
    pub packager: String,
    pub name: String,
    pub version: String,
}

/// Downloadable tool. Carried verbatim through rewrites; the synchronizer
/// never edits tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub systems: Vec<ToolSystem>,
}

/// Per-host download for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSystem {
    pub host: String,
    pub url: String,
    pub archive_file_name: String,
    pub checksum: Checksum,
    #[serde(with = "size_string")]
    pub size: u64,
}

/// A checksum value in the index's `ALGO:hexdigest` format,
/// e.g. `SHA-256:9F86D08...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum {
    pub algorithm: String,
    pub digest: String,
}

impl Checksum {
    /// A SHA-256 checksum from an uppercase hex digest.
    pub fn sha256(digest: impl Into<String>) -> Self {
        Self {
            algorithm: "SHA-256".to_string(),
            digest: digest.into(),
        }
    }
}

impl FromStr for Checksum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, digest) = s
            .split_once(':')
            .ok_or_else(|| format!("checksum {s:?} is not in ALGO:hexdigest form"))?;
        if algorithm.is_empty() || digest.is_empty() {
            return Err(format!("checksum {s:?} is not in ALGO:hexdigest form"));
        }
        Ok(Self {
            algorithm: algorithm.to_string(),
            digest: digest.to_string(),
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl TryFrom<String> for Checksum {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.to_string()
    }
}

/// The index stores archive sizes as decimal strings. Hand-edited documents
/// occasionally carry bare numbers; accept both, always write the string
/// form.
mod size_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(t) => t.trim().parse().map_err(de::Error::custom),
        }
    }
}
