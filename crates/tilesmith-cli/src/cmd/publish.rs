//! Publish command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tilesmith_core::manifest::load_tilefile;
use tilesmith_core::{PublishRequest, Publisher, S3UploaderProvider};
use tilesmith_schema::LockUpdate;

/// Upload a release tarball and print its lock entry
pub async fn publish(config_path: &Path, lock_path: &Path, request: &PublishRequest) -> Result<()> {
    let tilefile = load_tilefile(config_path)
        .await
        .context("Failed to load release source configuration")?;

    let publisher = Publisher::new(tilefile, lock_path, Arc::new(S3UploaderProvider));
    let outcome = publisher.publish(request).await?;

    match outcome.lock_update {
        Some(LockUpdate::Replaced) => println!("# updated {}", lock_path.display()),
        Some(LockUpdate::Appended) => println!(
            "# could not find release in {}. appended release lock to releases",
            lock_path.display()
        ),
        None => {}
    }

    let entry = toml::to_string(&outcome.release).context("Failed to encode release lock")?;
    print!("{entry}");

    Ok(())
}
