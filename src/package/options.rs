use std::path::PathBuf;

use crate::checksum::ManifestMode;

pub const DEFAULT_TOOL_NAME: &str = "safeparts";
pub const DEFAULT_BINARIES: [&str; 2] = ["safeparts", "safeparts-tui"];
pub const DEFAULT_LICENSE: &str = "LICENSE";

/// Inputs of a packaging run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOptions {
    /// Raw version as given (`1.2.3`, `v1.2.3`, `refs/tags/v1.2.3`)
    pub version: String,
    /// Repository root; the current directory when unset
    pub root: Option<PathBuf>,
    /// Cross-compilation target triple
    pub target: Option<String>,
    /// Output directory; `<root>/dist/release` when unset
    pub out_dir: Option<PathBuf>,
    /// Tool name used as the first part of the release name
    pub name: String,
    /// Base names of the binaries to package
    pub binaries: Vec<String>,
    /// License file, relative to the root
    pub license: PathBuf,
    pub manifest_mode: ManifestMode,
}

impl PackageOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            version: String::new(),
            root: None,
            target: None,
            out_dir: None,
            name: DEFAULT_TOOL_NAME.to_string(),
            binaries: DEFAULT_BINARIES.iter().map(|b| b.to_string()).collect(),
            license: PathBuf::from(DEFAULT_LICENSE),
            manifest_mode: ManifestMode::default(),
        }
    }
}
