//! Object store clients - side effects (network, filesystem)
//!
//! Release sources talk to storage through these narrow traits so that tests
//! and alternative backends can stand in for S3.

pub mod local;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;

use crate::error::StoreError;

pub use local::LocalStore;
pub use s3::S3Client;

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Continuation token for the next page; `None` on the last page.
    pub next: Option<String>,
}

#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Fetch the page of keys following `continuation` (the first page when `None`).
    async fn list_page(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError>;
}

#[async_trait]
pub trait ObjectDownloader: Send + Sync {
    /// Stream the object at `key` into `file`, returning the number of bytes written.
    async fn download(&self, bucket: &str, key: &str, file: File) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Upload the file at `path` as `key`.
    async fn upload(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError>;
}

/// List every key in `bucket`, following continuation tokens until the last page.
pub async fn list_all_keys(
    lister: &dyn ObjectLister,
    bucket: &str,
) -> Result<Vec<String>, StoreError> {
    let mut keys = Vec::new();
    let mut continuation = None;
    let mut pages = 0usize;

    loop {
        let page = lister.list_page(bucket, continuation).await?;
        pages += 1;
        keys.extend(page.keys);
        match page.next {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    tracing::debug!(bucket, pages, keys = keys.len(), "listed bucket");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves pre-baked pages keyed by their continuation token.
    struct PagedLister {
        pages: Vec<ObjectPage>,
        requests: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl ObjectLister for PagedLister {
        async fn list_page(
            &self,
            _bucket: &str,
            continuation: Option<String>,
        ) -> Result<ObjectPage, StoreError> {
            self.requests.lock().unwrap().push(continuation.clone());
            let index = continuation.map_or(0, |t| t.parse::<usize>().unwrap());
            Ok(self.pages[index].clone())
        }
    }

    #[tokio::test]
    async fn drains_every_page() {
        let lister = PagedLister {
            pages: vec![
                ObjectPage {
                    keys: vec!["a".into(), "b".into()],
                    next: Some("1".into()),
                },
                ObjectPage {
                    keys: vec![],
                    next: Some("2".into()),
                },
                ObjectPage {
                    keys: vec!["c".into()],
                    next: None,
                },
            ],
            requests: Mutex::new(Vec::new()),
        };

        let keys = list_all_keys(&lister, "bucket").await.unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(
            *lister.requests.lock().unwrap(),
            vec![None, Some("1".to_string()), Some("2".to_string())]
        );
    }

    struct FailingLister;

    #[async_trait]
    impl ObjectLister for FailingLister {
        async fn list_page(&self, _: &str, _: Option<String>) -> Result<ObjectPage, StoreError> {
            Err(StoreError::Remote("AccessDenied".to_string()))
        }
    }

    #[tokio::test]
    async fn listing_failure_is_surfaced() {
        let err = list_all_keys(&FailingLister, "bucket").await.unwrap_err();
        assert_eq!(err.to_string(), "AccessDenied");
    }
}
