//! Domain-specific errors for fetching and publishing releases

use std::path::PathBuf;

use thiserror::Error;
use tilesmith_schema::ReleaseId;

/// A failure reported by an object store client.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Remote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Build a remote error from an SDK error, keeping its full cause chain.
    pub fn remote(err: impl std::error::Error) -> Self {
        Self::Remote(aws_sdk_s3::error::DisplayErrorContext(err).to_string())
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid release key pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("failed to list objects in {bucket:?}: {source}")]
    List { bucket: String, source: StoreError },

    #[error("failed to create file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to download file, {source} (key {key:?})")]
    Download { key: String, source: StoreError },

    #[error("{id} was located by release source {owner:?}, not {requested:?}")]
    ForeignRelease {
        id: ReleaseId,
        owner: String,
        requested: String,
    },

    #[error("couldn't find {name:?} {version} in any release source")]
    NotFound { name: String, version: String },

    #[error("release source {source_id:?} reported success but did not produce {id}")]
    Incomplete { source_id: String, id: ReleaseId },

    #[error("download task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("could not encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: toml::ser::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("could not read release {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("release path {} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error(
        "remote release source {:?} could not be found (only release sources of type s3 are supported){}",
        .remote,
        acceptable_sources(.valid)
    )]
    UnknownRemote { remote: String, valid: Vec<String> },

    #[error("could not configure s3 uploader client: {0}")]
    Uploader(#[source] StoreError),

    #[error("upload of {key:?} to {bucket:?} failed: {source}")]
    Upload {
        bucket: String,
        key: String,
        source: StoreError,
    },

    #[error("updating the lock file failed: {0}")]
    Lock(#[from] ConfigError),
}

fn acceptable_sources(valid: &[String]) -> String {
    if valid.is_empty() {
        String::new()
    } else {
        format!(", some acceptable sources are: {}", valid.join(", "))
    }
}
