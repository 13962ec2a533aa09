//! Fetch command

use std::path::Path;

use anyhow::{Context, Result};
use tilesmith_core::manifest::{load_lock, load_tilefile};
use tilesmith_core::{ReleaseDownloader, release_sources_from_tilefile};

/// Download every release pinned in the lock file into `releases_dir`
pub async fn fetch(
    config_path: &Path,
    lock_path: &Path,
    releases_dir: &Path,
    download_threads: usize,
) -> Result<()> {
    let tilefile = load_tilefile(config_path)
        .await
        .context("Failed to load release source configuration")?;
    let lock = load_lock(lock_path).await.context("Failed to load lock file")?;

    tokio::fs::create_dir_all(releases_dir)
        .await
        .with_context(|| format!("Failed to create {}", releases_dir.display()))?;

    let sources = release_sources_from_tilefile(&tilefile)
        .await
        .context("Failed to configure release sources")?;
    tracing::debug!(sources = sources.len(), "configured release sources");

    let requirements = lock.requirements();
    let local = ReleaseDownloader::new(sources)
        .with_concurrency(download_threads)
        .download_releases(releases_dir, &requirements)
        .await?;

    for release in local.values() {
        println!("{}", release.path.display());
    }

    Ok(())
}
