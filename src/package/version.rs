//! Release version normalization.
//!
//! Versions arrive from humans (`1.2.3`, `v1.2.3`) and from CI refs
//! (`refs/tags/v1.2.3`); release file names always use the bare form.

use std::fmt;

use serde::Serialize;

use crate::error::PackageError;

const TAG_REF_PREFIX: &str = "refs/tags/";

/// Strip a `refs/tags/` prefix, then a single leading `v`.
pub fn normalize(raw: &str) -> &str {
    let version = raw.strip_prefix(TAG_REF_PREFIX).unwrap_or(raw);
    version.strip_prefix('v').unwrap_or(version)
}

/// A normalized version that is safe to embed in a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    pub fn parse(raw: &str) -> Result<Self, PackageError> {
        let version = normalize(raw);
        if version.is_empty() || version.contains(['/', '\\']) {
            return Err(PackageError::InvalidVersion {
                raw: raw.to_string(),
            });
        }
        Ok(Self(version.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepted_forms() {
        for raw in ["1.2.3", "v1.2.3", "refs/tags/v1.2.3", "refs/tags/1.2.3"] {
            assert_eq!(normalize(raw), "1.2.3", "input {raw:?}");
        }
    }

    #[test]
    fn test_normalize_strips_only_one_v() {
        assert_eq!(normalize("vv1.0.0"), "v1.0.0");
    }

    #[test]
    fn test_normalize_keeps_prerelease_suffix() {
        assert_eq!(normalize("v2.0.0-rc.1"), "2.0.0-rc.1");
    }

    #[test]
    fn test_parse_valid() {
        let version = ReleaseVersion::parse("refs/tags/v2.0.0").unwrap();
        assert_eq!(version.as_str(), "2.0.0");
        assert_eq!(version.to_string(), "2.0.0");
    }

    #[test]
    fn test_parse_rejects_empty() {
        for raw in ["", "v", "refs/tags/", "refs/tags/v"] {
            assert!(
                matches!(
                    ReleaseVersion::parse(raw),
                    Err(PackageError::InvalidVersion { .. })
                ),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_path_separators() {
        assert!(ReleaseVersion::parse("refs/heads/main").is_err());
        assert!(ReleaseVersion::parse("refs/tags/release/1.0").is_err());
        assert!(ReleaseVersion::parse("..\\1.0").is_err());
    }
}
