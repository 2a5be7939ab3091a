use std::path::{Path, PathBuf};

use log::debug;

use crate::error::PackageError;
use crate::platform::Os;
use crate::runtime::Runtime;

use super::binary_name;

/// Resolve the expected binaries inside `release_dir`.
///
/// Every missing path is reported, not just the first one.
pub fn locate_binaries<R: Runtime>(
    runtime: &R,
    release_dir: &Path,
    bases: &[String],
    os: Os,
) -> Result<Vec<PathBuf>, PackageError> {
    let paths: Vec<PathBuf> = bases
        .iter()
        .map(|base| release_dir.join(binary_name(base, os)))
        .collect();

    let missing: Vec<PathBuf> = paths
        .iter()
        .filter(|p| !runtime.exists(p))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(PackageError::MissingArtifacts { paths: missing });
    }

    debug!("Found binaries: {:?}", paths);
    Ok(paths)
}
