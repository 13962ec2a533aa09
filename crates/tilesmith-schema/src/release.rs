//! Release identities.
//!
//! A release is named by `(name, version)`. Once compiled it also carries the
//! stemcell OS and version it was built against, and once located it carries
//! either a remote path inside a release source or a local file path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name and version of a release, independent of any stemcell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseId {
    /// Release name (e.g. `bpm`).
    pub name: String,
    /// Exact release version (e.g. `1.2.3-lts`).
    pub version: String,
}

impl ReleaseId {
    /// Create a new release id.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A compiled release that must be made available locally.
///
/// Requirements come from the lock file and are never modified during
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseRequirement {
    /// Release name.
    pub name: String,
    /// Exact release version.
    pub version: String,
    /// Operating system of the stemcell the release must be compiled against.
    pub stemcell_os: String,
    /// Version of the stemcell the release must be compiled against.
    pub stemcell_version: String,
}

impl ReleaseRequirement {
    /// Create a new requirement.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        stemcell_os: impl Into<String>,
        stemcell_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            stemcell_os: stemcell_os.into(),
            stemcell_version: stemcell_version.into(),
        }
    }

    /// The platform-independent identity of this requirement.
    pub fn id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }

    /// The fingerprint a remote object must carry to satisfy this requirement.
    pub fn fingerprint(&self) -> CompiledReleaseFingerprint {
        CompiledReleaseFingerprint {
            name: self.name.clone(),
            version: self.version.clone(),
            stemcell_os: self.stemcell_os.clone(),
            stemcell_version: self.stemcell_version.clone(),
        }
    }
}

/// What a remote object represents, as parsed from its key.
///
/// Structurally identical to [`ReleaseRequirement`]; equality between the two
/// is exact, field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompiledReleaseFingerprint {
    /// Release name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Stemcell operating system the object was compiled against.
    pub stemcell_os: String,
    /// Stemcell version the object was compiled against.
    pub stemcell_version: String,
}

impl CompiledReleaseFingerprint {
    /// The platform-independent identity of the fingerprinted release.
    pub fn id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }

    /// Deterministic local file name: `<name>-<version>-<os>-<os-version>.tgz`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}-{}.tgz",
            self.name, self.version, self.stemcell_os, self.stemcell_version
        )
    }
}

/// A release located in a release source but not yet downloaded.
///
/// Only the source identified by `source_id` can download it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRelease {
    /// The compiled release the remote object holds.
    pub fingerprint: CompiledReleaseFingerprint,
    /// Opaque locator inside the source (an object key for buckets).
    pub remote_path: String,
    /// Id of the source that produced this release.
    pub source_id: String,
}

impl RemoteRelease {
    /// The platform-independent identity of this release.
    pub fn id(&self) -> ReleaseId {
        self.fingerprint.id()
    }

    /// Promote to a [`LocalRelease`] once its bytes are written to `path`.
    pub fn as_local(&self, path: impl Into<PathBuf>) -> LocalRelease {
        LocalRelease {
            id: self.id(),
            path: path.into(),
        }
    }
}

/// A release available on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalRelease {
    /// Identity of the downloaded release.
    pub id: ReleaseId,
    /// Path of the downloaded tarball.
    pub path: PathBuf,
}

/// Downloaded releases keyed by identity, one entry per release.
pub type LocalReleaseSet = BTreeMap<ReleaseId, LocalRelease>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_and_fingerprint_agree() {
        let req = ReleaseRequirement::new("bpm", "1.2.3-lts", "ubuntu-xenial", "190.0.0");
        let fp = req.fingerprint();
        assert_eq!(fp.id(), req.id());
        assert_eq!(fp.file_name(), "bpm-1.2.3-lts-ubuntu-xenial-190.0.0.tgz");
    }

    #[test]
    fn fingerprint_equality_is_exact() {
        let a = ReleaseRequirement::new("bpm", "1.2.3", "ubuntu-xenial", "190.0.0").fingerprint();
        let b = ReleaseRequirement::new("bpm", "1.2.3", "ubuntu-xenial", "190.0").fingerprint();
        assert_ne!(a, b);
    }

    #[test]
    fn remote_release_promotes_to_local() {
        let remote = RemoteRelease {
            fingerprint: ReleaseRequirement::new("uaa", "7.0", "ubuntu-jammy", "1.1")
                .fingerprint(),
            remote_path: "uaa/uaa-7.0-ubuntu-jammy-1.1.tgz".to_string(),
            source_id: "compiled-releases".to_string(),
        };
        let local = remote.as_local("/tmp/releases/uaa-7.0-ubuntu-jammy-1.1.tgz");
        assert_eq!(local.id, ReleaseId::new("uaa", "7.0"));
    }

    #[test]
    fn release_id_display() {
        assert_eq!(ReleaseId::new("evangelion", "3.33").to_string(), "evangelion 3.33");
    }
}
