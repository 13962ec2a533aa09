//! Shared types for tilesmith.
//!
//! Everything here is plain data: release identities at each stage of
//! resolution, the lock file schema and the release source configuration
//! schema. Behavior lives in `tilesmith-core`.

pub mod config;
pub mod hash;
pub mod lock;
pub mod release;

// Re-exports
pub use config::{LocalSourceConfig, ReleaseSourceConfig, S3SourceConfig, Tilefile};
pub use hash::Sha256Hash;
pub use lock::{LockUpdate, ReleaseLock, ReleasesLock, StemcellLock};
pub use release::{
    CompiledReleaseFingerprint, LocalRelease, LocalReleaseSet, ReleaseId, ReleaseRequirement,
    RemoteRelease,
};
