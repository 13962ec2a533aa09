pub mod bucket;
pub mod checksum;
pub mod downloader;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod publish;
pub mod source;
pub mod store;

pub use bucket::{BucketReleaseSource, DEFAULT_DOWNLOAD_CONCURRENCY};
pub use downloader::ReleaseDownloader;
pub use error::{ConfigError, FetchError, PublishError, StoreError};
pub use pattern::ObjectKeyPattern;
pub use publish::{PublishOutcome, PublishRequest, Publisher, S3UploaderProvider, UploaderProvider};
pub use source::{
    MatchedReleases, ReleaseSource, release_source_from_config, release_sources_from_tilefile,
};
