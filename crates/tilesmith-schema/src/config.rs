//! Release source configuration (`tilesmith.toml`).
//!
//! Sources are listed in priority order: when several can satisfy a
//! requirement, the first one listed wins.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level structure of `tilesmith.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tilefile {
    /// Configured release sources, highest priority first.
    #[serde(default)]
    pub release_sources: Vec<ReleaseSourceConfig>,
}

impl Tilefile {
    /// Iterate over the configured S3 sources, in priority order.
    pub fn s3_sources(&self) -> impl Iterator<Item = &S3SourceConfig> {
        self.release_sources.iter().filter_map(|s| match s {
            ReleaseSourceConfig::S3(config) => Some(config),
            ReleaseSourceConfig::Local(_) => None,
        })
    }
}

/// A single release source, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReleaseSourceConfig {
    /// An S3-compatible bucket of compiled release tarballs.
    S3(S3SourceConfig),
    /// A local directory laid out like a bucket.
    Local(LocalSourceConfig),
}

impl ReleaseSourceConfig {
    /// Identifier used to tie located releases back to this source.
    pub fn id(&self) -> String {
        match self {
            Self::S3(config) => config.bucket.clone(),
            Self::Local(config) => config.path.display().to_string(),
        }
    }

    /// Regular expression matched against every key in the source.
    pub fn regex(&self) -> &str {
        match self {
            Self::S3(config) => &config.regex,
            Self::Local(config) => &config.regex,
        }
    }
}

/// Configuration for an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3SourceConfig {
    /// Bucket name; also the source's name in lock entries.
    pub bucket: String,
    /// Key pattern with `release_name`, `release_version`, `stemcell_os` and
    /// `stemcell_version` named groups.
    pub regex: String,
    /// AWS region (defaults to `us-east-1`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores such as `MinIO` or R2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub path_style: bool,
    /// Static access key id; the default AWS provider chain is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Static secret access key, paired with `access_key_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// Configuration for a local directory source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSourceConfig {
    /// Root directory; keys are `/`-separated paths relative to it.
    pub path: PathBuf,
    /// Key pattern, as for [`S3SourceConfig::regex`].
    pub regex: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}
