//! Release source abstraction and construction from configuration.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tilesmith_schema::{
    LocalReleaseSet, ReleaseRequirement, ReleaseSourceConfig, RemoteRelease, Tilefile,
};

use crate::bucket::BucketReleaseSource;
use crate::error::FetchError;
use crate::store::{LocalStore, S3Client};

/// Result of matching requirements against one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedReleases {
    /// Releases the source can supply, at most one per requirement.
    pub matched: Vec<RemoteRelease>,
    /// Requirements the source cannot supply.
    pub missing: Vec<ReleaseRequirement>,
}

/// A place compiled releases can be located and downloaded from.
///
/// `matched.len() + missing.len()` always equals the number of requirements
/// passed to [`ReleaseSource::find_matching_releases`].
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Identifier stamped onto every [`RemoteRelease`] this source produces.
    fn id(&self) -> &str;

    /// Partition `requirements` into releases this source holds and those it lacks.
    async fn find_matching_releases(
        &self,
        requirements: &[ReleaseRequirement],
    ) -> Result<MatchedReleases, FetchError>;

    /// Download `releases` into `target_dir` with at most `concurrency`
    /// transfers in flight (`0` selects the default).
    async fn download_releases(
        &self,
        target_dir: &Path,
        releases: &[RemoteRelease],
        concurrency: usize,
    ) -> Result<LocalReleaseSet, FetchError>;
}

/// Build the source described by one configuration entry.
///
/// # Errors
///
/// Fails when the entry's key pattern is not a valid regular expression.
pub async fn release_source_from_config(
    config: &ReleaseSourceConfig,
) -> Result<Arc<dyn ReleaseSource>, FetchError> {
    let source: Arc<dyn ReleaseSource> = match config {
        ReleaseSourceConfig::S3(s3) => {
            let client = Arc::new(S3Client::from_config(s3).await);
            Arc::new(BucketReleaseSource::new(
                config.id(),
                &s3.bucket,
                &s3.regex,
                client.clone(),
                client,
            )?)
        }
        ReleaseSourceConfig::Local(local) => {
            let store = Arc::new(LocalStore);
            Arc::new(BucketReleaseSource::new(
                config.id(),
                local.path.to_string_lossy(),
                &local.regex,
                store.clone(),
                store,
            )?)
        }
    };
    Ok(source)
}

/// Build every configured source, preserving priority order.
///
/// # Errors
///
/// Fails on the first entry with an invalid key pattern.
pub async fn release_sources_from_tilefile(
    tilefile: &Tilefile,
) -> Result<Vec<Arc<dyn ReleaseSource>>, FetchError> {
    let mut sources = Vec::with_capacity(tilefile.release_sources.len());
    for config in &tilefile.release_sources {
        sources.push(release_source_from_config(config).await?);
    }
    Ok(sources)
}
