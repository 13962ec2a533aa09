//! Multi-source release resolution.
//!
//! Sources are consulted in priority order; the first one that holds a
//! requirement downloads it.

use std::path::Path;
use std::sync::Arc;

use tilesmith_schema::{LocalRelease, LocalReleaseSet, ReleaseRequirement};

use crate::error::FetchError;
use crate::source::ReleaseSource;

pub struct ReleaseDownloader {
    sources: Vec<Arc<dyn ReleaseSource>>,
    concurrency: usize,
}

impl std::fmt::Debug for ReleaseDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<_> = self.sources.iter().map(|s| s.id()).collect();
        f.debug_struct("ReleaseDownloader")
            .field("sources", &ids)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ReleaseDownloader {
    /// Create a downloader over `sources`, highest priority first.
    pub fn new(sources: Vec<Arc<dyn ReleaseSource>>) -> Self {
        Self {
            sources,
            concurrency: 0,
        }
    }

    /// Set the transfer concurrency passed to sources (`0` keeps their default).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Locate `requirement` in the first source that holds it and download it
    /// into `target_dir`.
    ///
    /// # Errors
    ///
    /// A source failure aborts immediately without trying lower-priority
    /// sources. [`FetchError::NotFound`] if no source holds the release.
    pub async fn download_release(
        &self,
        target_dir: &Path,
        requirement: &ReleaseRequirement,
    ) -> Result<LocalRelease, FetchError> {
        let requirements = std::slice::from_ref(requirement);

        for source in &self.sources {
            let found = source.find_matching_releases(requirements).await?;
            let Some(release) = found.matched.into_iter().next() else {
                tracing::debug!(source = source.id(), release = %requirement.id(), "not in source");
                continue;
            };

            tracing::info!(source = source.id(), key = %release.remote_path, "resolved release");
            let id = release.id();
            let mut local = source
                .download_releases(target_dir, &[release], self.concurrency)
                .await?;

            return local.remove(&id).ok_or_else(|| FetchError::Incomplete {
                source_id: source.id().to_string(),
                id,
            });
        }

        Err(FetchError::NotFound {
            name: requirement.name.clone(),
            version: requirement.version.clone(),
        })
    }

    /// Download every requirement in turn. The first failure aborts.
    pub async fn download_releases(
        &self,
        target_dir: &Path,
        requirements: &[ReleaseRequirement],
    ) -> Result<LocalReleaseSet, FetchError> {
        let mut local = LocalReleaseSet::new();
        for requirement in requirements {
            let release = self.download_release(target_dir, requirement).await?;
            local.insert(release.id.clone(), release);
        }
        Ok(local)
    }
}
