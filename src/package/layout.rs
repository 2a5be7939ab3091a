use std::path::{Path, PathBuf};

use crate::archive::ArchiveFormat;
use crate::platform::{Os, Platform};

use super::ReleaseVersion;

/// Checksum manifest written next to the archives.
pub const MANIFEST_FILE_NAME: &str = "SHA256SUMS.txt";

/// File name of an executable on the given OS.
pub fn binary_name(base: &str, os: Os) -> String {
    format!("{}{}", base, os.exe_suffix())
}

/// Directory where `cargo build --release [--target <triple>]` leaves binaries.
///
/// An empty triple is treated as no triple.
pub fn release_dir(root: &Path, target: Option<&str>) -> PathBuf {
    match target.filter(|t| !t.is_empty()) {
        Some(triple) => root.join("target").join(triple).join("release"),
        None => root.join("target").join("release"),
    }
}

pub fn default_out_dir(root: &Path) -> PathBuf {
    root.join("dist").join("release")
}

/// `<tool>-<version>-<os>-<arch>`, used for both the staging directory and
/// the top-level folder inside the archive.
pub fn stage_name(tool: &str, version: &ReleaseVersion, platform: &Platform) -> String {
    format!("{}-{}-{}-{}", tool, version, platform.os, platform.arch)
}

/// Archive file name for a stage: `.zip` on Windows, `.tar.gz` elsewhere.
pub fn archive_name(stage_name: &str, os: Os) -> String {
    format!("{}.{}", stage_name, ArchiveFormat::for_os(os).extension())
}
