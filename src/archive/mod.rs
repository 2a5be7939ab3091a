mod tar_gz;
mod zip;

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::platform::Os;

pub use tar_gz::TarGzArchiver;
pub use zip::ZipArchiver;

/// Archive container, chosen purely by the target OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub fn for_os(os: Os) -> Self {
        if os.is_windows() { Self::Zip } else { Self::TarGz }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for format-specific archive writers
#[cfg_attr(test, mockall::automock)]
pub trait Archiver: Send + Sync {
    /// Check if this archiver can produce the given archive file
    fn can_handle(&self, archive_path: &Path) -> bool;

    /// Pack every entry under `source_dir` into `archive_path`, rooted at
    /// `root_name/` inside the archive. An existing file is truncated.
    fn create(&self, source_dir: &Path, root_name: &str, archive_path: &Path) -> Result<()>;
}

/// Dispatcher that selects the appropriate archiver based on the file name.
pub struct ArchiverImpl {
    tar_gz: TarGzArchiver,
    zip: ZipArchiver,
}

impl Default for ArchiverImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiverImpl {
    pub fn new() -> Self {
        Self {
            tar_gz: TarGzArchiver,
            zip: ZipArchiver,
        }
    }
}

impl Archiver for ArchiverImpl {
    fn can_handle(&self, archive_path: &Path) -> bool {
        self.tar_gz.can_handle(archive_path) || self.zip.can_handle(archive_path)
    }

    #[tracing::instrument(skip(self, source_dir, archive_path))]
    fn create(&self, source_dir: &Path, root_name: &str, archive_path: &Path) -> Result<()> {
        if self.tar_gz.can_handle(archive_path) {
            return self.tar_gz.create(source_dir, root_name, archive_path);
        }
        if self.zip.can_handle(archive_path) {
            return self.zip.create(source_dir, root_name, archive_path);
        }
        Err(anyhow!(
            "Unsupported archive format: {}",
            archive_path.display()
        ))
    }
}

/// Path of `rel` inside the archive, always `/`-separated.
fn entry_name(root_name: &str, rel: &Path) -> String {
    let mut name = root_name.to_string();
    for component in rel.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}
