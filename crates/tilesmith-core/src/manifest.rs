//! Loading and saving `tilesmith.toml` and `tilesmith.lock`.

use std::path::{Path, PathBuf};

use tilesmith_schema::{ReleasesLock, Tilefile};
use tokio::fs;

use crate::error::ConfigError;

/// The lock file that sits next to a config file: `tilesmith.toml` -> `tilesmith.lock`.
pub fn default_lock_path(config_path: &Path) -> PathBuf {
    config_path.with_extension("lock")
}

/// Load and parse the release source configuration.
pub async fn load_tilefile(path: &Path) -> Result<Tilefile, ConfigError> {
    load_toml(path).await
}

/// Load and parse the lock file.
///
/// Unlike the config, a missing lock file is an error: there is nothing to
/// fetch and nothing to update.
pub async fn load_lock(path: &Path) -> Result<ReleasesLock, ConfigError> {
    load_toml(path).await
}

async fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrite an existing lock file in place, keeping its permissions.
///
/// The new content goes to a temporary sibling first and is renamed over the
/// original, so readers never see a partial file.
pub async fn save_lock(lock: &ReleasesLock, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let permissions = fs::metadata(path).await.map_err(write_err)?.permissions();
    let content = toml::to_string_pretty(lock).map_err(|source| ConfigError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("lock.tmp");
    fs::write(&temp_path, &content).await.map_err(write_err)?;
    fs::set_permissions(&temp_path, permissions)
        .await
        .map_err(write_err)?;
    fs::rename(&temp_path, path).await.map_err(write_err)?;

    tracing::debug!(path = %path.display(), releases = lock.releases.len(), "wrote lock file");
    Ok(())
}
