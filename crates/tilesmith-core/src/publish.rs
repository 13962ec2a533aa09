//! Publishing a release tarball to an S3 release source.
//!
//! A published tarball is stored under its base file name in the bucket and
//! described by a [`ReleaseLock`] carrying its checksum and location. The lock
//! entry can optionally be written back to `tilesmith.lock`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tilesmith_schema::{LockUpdate, ReleaseLock, ReleasesLock, S3SourceConfig, Tilefile};

use crate::checksum::sha256_file;
use crate::error::{PublishError, StoreError};
use crate::manifest::{load_lock, save_lock};
use crate::store::{ObjectUploader, S3Client};

/// Builds an uploader for a configured bucket.
#[async_trait]
pub trait UploaderProvider: Send + Sync {
    async fn uploader(
        &self,
        config: &S3SourceConfig,
    ) -> Result<Arc<dyn ObjectUploader>, StoreError>;
}

/// Uploads through the AWS SDK.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3UploaderProvider;

#[async_trait]
impl UploaderProvider for S3UploaderProvider {
    async fn uploader(
        &self,
        config: &S3SourceConfig,
    ) -> Result<Arc<dyn ObjectUploader>, StoreError> {
        Ok(Arc::new(S3Client::from_config(config).await))
    }
}

/// What to publish and where.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Path of the release tarball; its base name becomes the object key.
    pub path: PathBuf,
    pub name: String,
    pub version: String,
    /// Bucket name of the destination S3 release source.
    pub remote: String,
    /// Record the resulting entry in the lock file.
    pub update_lock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub release: ReleaseLock,
    /// How the lock file changed; `None` when it was left alone.
    pub lock_update: Option<LockUpdate>,
}

pub struct Publisher {
    tilefile: Tilefile,
    lock_path: PathBuf,
    provider: Arc<dyn UploaderProvider>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("lock_path", &self.lock_path)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    pub fn new(
        tilefile: Tilefile,
        lock_path: impl Into<PathBuf>,
        provider: Arc<dyn UploaderProvider>,
    ) -> Self {
        Self {
            tilefile,
            lock_path: lock_path.into(),
            provider,
        }
    }

    /// The S3 source whose bucket is `remote`.
    fn destination(&self, remote: &str) -> Result<&S3SourceConfig, PublishError> {
        self.tilefile
            .s3_sources()
            .find(|s| s.bucket == remote)
            .ok_or_else(|| PublishError::UnknownRemote {
                remote: remote.to_string(),
                valid: self.tilefile.s3_sources().map(|s| s.bucket.clone()).collect(),
            })
    }

    /// Upload the tarball and build its lock entry.
    ///
    /// # Errors
    ///
    /// Fails if the tarball cannot be read, `remote` is not a configured S3
    /// source, the upload fails, or the lock file cannot be rewritten. With
    /// `update_lock` set the lock is read first, so an unreadable lock stops
    /// the publish before anything is uploaded.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        let lock = if request.update_lock {
            Some(load_lock(&self.lock_path).await?)
        } else {
            None
        };

        let sha256 = sha256_file(&request.path)
            .await
            .map_err(|source| PublishError::Read {
                path: request.path.clone(),
                source,
            })?;

        let destination = self.destination(&request.remote)?;
        let uploader = self
            .provider
            .uploader(destination)
            .await
            .map_err(PublishError::Uploader)?;

        let key = remote_key(&request.path)?;
        tracing::info!(bucket = %destination.bucket, key = %key, "uploading release");
        uploader
            .upload(&destination.bucket, &key, &request.path)
            .await
            .map_err(|source| PublishError::Upload {
                bucket: destination.bucket.clone(),
                key: key.clone(),
                source,
            })?;

        let release = ReleaseLock {
            name: request.name.clone(),
            version: request.version.clone(),
            sha256,
            remote_source: request.remote.clone(),
            remote_path: key,
        };

        let lock_update = match lock {
            Some(lock) => Some(self.update_lock(lock, release.clone()).await?),
            None => None,
        };

        Ok(PublishOutcome {
            release,
            lock_update,
        })
    }

    async fn update_lock(
        &self,
        mut lock: ReleasesLock,
        release: ReleaseLock,
    ) -> Result<LockUpdate, PublishError> {
        let update = lock.upsert(release);
        save_lock(&lock, &self.lock_path).await?;
        tracing::info!(path = %self.lock_path.display(), ?update, "updated lock file");
        Ok(update)
    }
}

fn remote_key(path: &Path) -> Result<String, PublishError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PublishError::NoFileName(path.to_path_buf()))
}
