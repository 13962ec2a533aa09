//! Lock file schema (`tilesmith.lock`).
//!
//! The lock pins every release to an exact version and, once published, to
//! the checksum and remote location of its tarball. Combined with the stemcell
//! table it yields the flat list of [`ReleaseRequirement`]s that fetching
//! resolves.

use serde::{Deserialize, Serialize};

use crate::hash::Sha256Hash;
use crate::release::{ReleaseId, ReleaseRequirement};

/// The stemcell every locked release is compiled against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StemcellLock {
    /// Stemcell operating system (e.g. `ubuntu-xenial`).
    pub os: String,
    /// Stemcell version (e.g. `190.0.0`).
    pub version: String,
}

/// A single pinned release.
///
/// Entries are keyed by `name` within [`ReleasesLock::releases`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLock {
    /// Release name.
    pub name: String,
    /// Exact release version.
    pub version: String,
    /// SHA-256 of the release tarball, empty until published.
    #[serde(default, skip_serializing_if = "Sha256Hash::is_empty")]
    pub sha256: Sha256Hash,
    /// Name of the release source holding the tarball (the bucket for S3).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote_source: String,
    /// Location of the tarball inside `remote_source`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote_path: String,
}

impl ReleaseLock {
    /// The platform-independent identity of this entry.
    pub fn id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }
}

/// Outcome of [`ReleasesLock::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockUpdate {
    /// An entry with the same name existed and was replaced in place.
    Replaced,
    /// No entry had the name; the new one was appended.
    Appended,
}

/// Top-level structure of `tilesmith.lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReleasesLock {
    /// Stemcell shared by all releases.
    #[serde(default)]
    pub stemcell: StemcellLock,
    /// Pinned releases, in file order.
    #[serde(default)]
    pub releases: Vec<ReleaseLock>,
}

impl ReleasesLock {
    /// Build one requirement per locked release, compiled against the lock's stemcell.
    pub fn requirements(&self) -> Vec<ReleaseRequirement> {
        self.releases
            .iter()
            .map(|r| {
                ReleaseRequirement::new(
                    &r.name,
                    &r.version,
                    &self.stemcell.os,
                    &self.stemcell.version,
                )
            })
            .collect()
    }

    /// Replace the entry named like `lock`, or append it if there is none.
    ///
    /// When several entries share the name, the last one is replaced.
    pub fn upsert(&mut self, lock: ReleaseLock) -> LockUpdate {
        match self.releases.iter().rposition(|r| r.name == lock.name) {
            Some(index) => {
                self.releases[index] = lock;
                LockUpdate::Replaced
            }
            None => {
                self.releases.push(lock);
                LockUpdate::Appended
            }
        }
    }
}
