//! Release source backed by a bucket of compiled release tarballs.
//!
//! Object keys are matched against an [`ObjectKeyPattern`]; downloads run in
//! parallel, bounded by a semaphore, one task per release.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tilesmith_schema::{
    CompiledReleaseFingerprint, LocalRelease, LocalReleaseSet, ReleaseRequirement, RemoteRelease,
};
use tokio::fs::File;
use tokio::sync::Semaphore;

use crate::error::FetchError;
use crate::pattern::ObjectKeyPattern;
use crate::source::{MatchedReleases, ReleaseSource};
use crate::store::{ObjectDownloader, ObjectLister, list_all_keys};

/// Parallel transfers used when a caller asks for `0`.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 5;

pub struct BucketReleaseSource {
    id: String,
    bucket: String,
    pattern: ObjectKeyPattern,
    lister: Arc<dyn ObjectLister>,
    downloader: Arc<dyn ObjectDownloader>,
}

impl std::fmt::Debug for BucketReleaseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketReleaseSource")
            .field("id", &self.id)
            .field("bucket", &self.bucket)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl BucketReleaseSource {
    /// Create a source over `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Pattern`] if `pattern` does not compile.
    pub fn new(
        id: impl Into<String>,
        bucket: impl Into<String>,
        pattern: &str,
        lister: Arc<dyn ObjectLister>,
        downloader: Arc<dyn ObjectDownloader>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            id: id.into(),
            bucket: bucket.into(),
            pattern: ObjectKeyPattern::new(pattern)?,
            lister,
            downloader,
        })
    }

    /// Every key in the bucket that parses as a release, by fingerprint.
    ///
    /// If two keys parse to the same fingerprint the later one in listing
    /// order is kept.
    pub async fn list_matching_objects(
        &self,
    ) -> Result<HashMap<CompiledReleaseFingerprint, String>, FetchError> {
        let keys = list_all_keys(self.lister.as_ref(), &self.bucket)
            .await
            .map_err(|source| FetchError::List {
                bucket: self.bucket.clone(),
                source,
            })?;

        let mut objects = HashMap::new();
        for key in keys {
            let Some(fingerprint) = self.pattern.fingerprint(&key) else {
                continue;
            };
            if let Some(previous) = objects.insert(fingerprint, key) {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %previous,
                    "superseded by a later key"
                );
            }
        }

        tracing::info!(bucket = %self.bucket, count = objects.len(), "found releases in bucket");
        Ok(objects)
    }
}

#[async_trait]
impl ReleaseSource for BucketReleaseSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn find_matching_releases(
        &self,
        requirements: &[ReleaseRequirement],
    ) -> Result<MatchedReleases, FetchError> {
        let objects = self.list_matching_objects().await?;

        let mut result = MatchedReleases::default();
        for requirement in requirements {
            let fingerprint = requirement.fingerprint();
            match objects.get(&fingerprint) {
                Some(key) => result.matched.push(RemoteRelease {
                    fingerprint,
                    remote_path: key.clone(),
                    source_id: self.id.clone(),
                }),
                None => result.missing.push(requirement.clone()),
            }
        }

        Ok(result)
    }

    async fn download_releases(
        &self,
        target_dir: &Path,
        releases: &[RemoteRelease],
        concurrency: usize,
    ) -> Result<LocalReleaseSet, FetchError> {
        if let Some(foreign) = releases.iter().find(|r| r.source_id != self.id) {
            return Err(FetchError::ForeignRelease {
                id: foreign.id(),
                owner: foreign.source_id.clone(),
                requested: self.id.clone(),
            });
        }

        let concurrency = if concurrency == 0 {
            DEFAULT_DOWNLOAD_CONCURRENCY
        } else {
            concurrency
        };
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let mut tasks = FuturesUnordered::new();
        for release in releases.iter().cloned() {
            let semaphore = semaphore.clone();
            let downloader = self.downloader.clone();
            let bucket = self.bucket.clone();
            let path = target_dir.join(release.fingerprint.file_name());

            tasks.push(tokio::spawn(async move {
                // A closed semaphore means another transfer failed.
                let Ok(_permit) = semaphore.acquire().await else {
                    return Ok(None);
                };

                let result = fetch_object(downloader.as_ref(), &bucket, release, path).await;
                if result.is_err() {
                    // Close while the permit is still held so no queued
                    // transfer can take it.
                    semaphore.close();
                }
                result.map(Some)
            }));
        }

        let mut local = LocalReleaseSet::new();
        while let Some(joined) = tasks.next().await {
            match joined.map_err(FetchError::from).and_then(|r| r) {
                Ok(Some(release)) => {
                    local.insert(release.id.clone(), release);
                }
                Ok(None) => {}
                Err(err) => {
                    semaphore.close();
                    return Err(err);
                }
            }
        }

        Ok(local)
    }
}

async fn fetch_object(
    downloader: &dyn ObjectDownloader,
    bucket: &str,
    release: RemoteRelease,
    path: PathBuf,
) -> Result<LocalRelease, FetchError> {
    let file = File::create(&path)
        .await
        .map_err(|source| FetchError::CreateFile {
            path: path.clone(),
            source,
        })?;

    tracing::info!(key = %release.remote_path, path = %path.display(), "downloading release");
    let bytes = downloader
        .download(bucket, &release.remote_path, file)
        .await
        .map_err(|source| FetchError::Download {
            key: release.remote_path.clone(),
            source,
        })?;
    tracing::debug!(key = %release.remote_path, bytes, "downloaded release");

    Ok(release.as_local(path))
}
