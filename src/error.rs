//! Fatal conditions that abort a packaging run.
//!
//! Filesystem failures are not listed here; they travel as `anyhow::Error`
//! with context attached at the call site.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackageError {
    /// The running OS has no canonical identifier.
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// One or more expected binaries are absent from the release directory.
    #[error(
        "missing built binaries (run cargo build --release first): {}",
        join_paths(paths)
    )]
    MissingArtifacts { paths: Vec<PathBuf> },

    /// The version is unusable as part of a directory name.
    #[error("invalid version {raw:?}: expected something like 1.2.3, v1.2.3 or refs/tags/v1.2.3")]
    InvalidVersion { raw: String },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
