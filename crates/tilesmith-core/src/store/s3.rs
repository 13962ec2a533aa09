//! S3-compatible object store client.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::primitives::ByteStream;
use tilesmith_schema::S3SourceConfig;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::{ObjectDownloader, ObjectLister, ObjectPage, ObjectUploader};
use crate::error::StoreError;

/// Client for listing, downloading and uploading objects in S3 buckets.
#[derive(Debug, Clone)]
pub struct S3Client {
    client: s3::Client,
}

impl S3Client {
    /// Build a client for the bucket described by `config`.
    ///
    /// Static credentials from the config take precedence; otherwise the
    /// default AWS provider chain (environment, profile, instance metadata)
    /// is used.
    pub async fn from_config(config: &S3SourceConfig) -> Self {
        let region = s3::config::Region::new(config.region.clone());

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials = s3::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "tilesmith-config",
                );
                s3::Config::builder()
                    .behavior_version_latest()
                    .region(region)
                    .credentials_provider(credentials)
            }
            _ => {
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                s3::config::Builder::from(&shared)
            }
        };

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = s3::Client::from_conf(builder.force_path_style(config.path_style).build());
        Self { client }
    }
}

#[async_trait]
impl ObjectLister for S3Client {
    async fn list_page(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(StoreError::remote)?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        let next = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage { keys, next })
    }
}

#[async_trait]
impl ObjectDownloader for S3Client {
    async fn download(&self, bucket: &str, key: &str, mut file: File) -> Result<u64, StoreError> {
        let mut output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(StoreError::remote)?;

        let mut written = 0u64;
        while let Some(chunk) = output.body.try_next().await.map_err(StoreError::remote)? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[async_trait]
impl ObjectUploader for S3Client {
    async fn upload(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(StoreError::remote)?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type("application/gzip")
            .send()
            .await
            .map_err(StoreError::remote)?;

        Ok(())
    }
}
