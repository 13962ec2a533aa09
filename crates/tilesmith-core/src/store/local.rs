//! Directory-backed object store.
//!
//! The "bucket" is a root directory and keys are `/`-separated paths of the
//! regular files beneath it, so a mirrored bucket can be served from disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use super::{ObjectDownloader, ObjectLister, ObjectPage};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn object_path(root: &str, key: &str) -> PathBuf {
        key.split('/')
            .fold(PathBuf::from(root), |path, part| path.join(part))
    }
}

fn walk_keys(root: &Path) -> Result<Vec<String>, StoreError> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| StoreError::Remote(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        keys.push(key);
    }
    keys.sort();
    Ok(keys)
}

#[async_trait]
impl ObjectLister for LocalStore {
    /// Lists the whole tree in a single page.
    async fn list_page(
        &self,
        bucket: &str,
        _continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError> {
        let root = PathBuf::from(bucket);
        let keys = tokio::task::spawn_blocking(move || walk_keys(&root))
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))??;

        Ok(ObjectPage { keys, next: None })
    }
}

#[async_trait]
impl ObjectDownloader for LocalStore {
    async fn download(&self, bucket: &str, key: &str, mut file: File) -> Result<u64, StoreError> {
        let mut object = File::open(Self::object_path(bucket, key)).await?;
        let written = tokio::io::copy(&mut object, &mut file).await?;
        file.flush().await?;
        Ok(written)
    }
}
