//! Object key grammar for compiled releases.
//!
//! Object keys are an ad hoc serialization of a [`CompiledReleaseFingerprint`]:
//! a configured regular expression with four named capture groups recovers the
//! fingerprint from a key. Parsing is total; a key that does not match is
//! simply not a release.

use regex::Regex;
use tilesmith_schema::CompiledReleaseFingerprint;

use crate::error::FetchError;

pub const RELEASE_NAME: &str = "release_name";
pub const RELEASE_VERSION: &str = "release_version";
pub const STEMCELL_OS: &str = "stemcell_os";
pub const STEMCELL_VERSION: &str = "stemcell_version";

/// Capture groups every key pattern is expected to define.
pub const CAPTURE_GROUPS: [&str; 4] = [
    RELEASE_NAME,
    RELEASE_VERSION,
    STEMCELL_OS,
    STEMCELL_VERSION,
];

/// A compiled key pattern.
#[derive(Debug, Clone)]
pub struct ObjectKeyPattern {
    regex: Regex,
}

impl ObjectKeyPattern {
    /// Compile `pattern`.
    ///
    /// A pattern lacking one of [`CAPTURE_GROUPS`] is accepted with a warning;
    /// the missing field parses as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Pattern`] if the regular expression is invalid.
    pub fn new(pattern: &str) -> Result<Self, FetchError> {
        let regex = Regex::new(pattern).map_err(|source| FetchError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        for group in CAPTURE_GROUPS {
            if !regex.capture_names().flatten().any(|name| name == group) {
                tracing::warn!(pattern, group, "release key pattern has no such capture group");
            }
        }

        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parse `key` into the fingerprint it encodes, or `None` if it does not match.
    pub fn fingerprint(&self, key: &str) -> Option<CompiledReleaseFingerprint> {
        let captures = self.regex.captures(key)?;
        let group = |name: &str| {
            captures
                .name(name)
                .map_or_else(String::new, |m| m.as_str().to_string())
        };

        Some(CompiledReleaseFingerprint {
            name: group(RELEASE_NAME),
            version: group(RELEASE_VERSION),
            stemcell_os: group(STEMCELL_OS),
            stemcell_version: group(STEMCELL_VERSION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilesmith_schema::ReleaseRequirement;

    const PATTERN: &str = r"^2.5/.+/(?P<release_name>[a-z-_]+)-(?P<release_version>[0-9\.]+(-\w+(\.[0-9]+)?)?)-(?P<stemcell_os>[a-z-_]+)-(?P<stemcell_version>[\d\.]+)\.tgz$";

    #[test]
    fn parses_release_key() {
        let pattern = ObjectKeyPattern::new(PATTERN).unwrap();
        let fp = pattern
            .fingerprint("2.5/bpm/bpm-1.2.3-lts-ubuntu-xenial-190.0.0.tgz")
            .unwrap();
        assert_eq!(
            fp,
            ReleaseRequirement::new("bpm", "1.2.3-lts", "ubuntu-xenial", "190.0.0").fingerprint()
        );
    }

    #[test]
    fn generated_keys_parse_back() {
        let pattern = ObjectKeyPattern::new(PATTERN).unwrap();
        let requirements = [
            ReleaseRequirement::new("uaa", "74.0.0-rc.2", "ubuntu-xenial", "190.0.0"),
            ReleaseRequirement::new("cf-networking", "2.8.0-rc.1", "ubuntu-trusty", "3586.1"),
        ];
        for fp in requirements.iter().map(ReleaseRequirement::fingerprint) {
            let key = format!("2.5/{}/{}", fp.name, fp.file_name());
            assert_eq!(pattern.fingerprint(&key), Some(fp));
        }
    }

    #[test]
    fn unrelated_keys_do_not_match() {
        let pattern = ObjectKeyPattern::new(PATTERN).unwrap();
        assert_eq!(pattern.fingerprint("some-key"), None);
        assert_eq!(
            pattern.fingerprint("1.10/uaa/uaa-1.2.3-ubuntu-xenial-190.0.0.tgz"),
            None
        );
    }

    #[test]
    fn missing_group_parses_as_empty() {
        let pattern =
            ObjectKeyPattern::new(r"^(?P<release_name>[a-z]+)-(?P<release_version>[\d\.]+)\.tgz$")
                .unwrap();
        let fp = pattern.fingerprint("bpm-1.0.tgz").unwrap();
        assert_eq!(fp.name, "bpm");
        assert_eq!(fp.stemcell_os, "");
        assert_eq!(fp.stemcell_version, "");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let pattern = ObjectKeyPattern::new(PATTERN).unwrap();
        assert_eq!(
            pattern.fingerprint("2.5/BPM/BPM-1.2.3-ubuntu-xenial-190.0.0.tgz"),
            None
        );
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let err = ObjectKeyPattern::new("(?P<release_name>").unwrap_err();
        assert!(matches!(err, FetchError::Pattern { .. }));
    }
}
