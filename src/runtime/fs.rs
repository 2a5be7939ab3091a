//! File system operations (read, write, copy, directory, permissions).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to file {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn copy_impl(&self, from: &Path, to: &Path) -> Result<u64> {
        let bytes = fs::copy(from, to).with_context(|| {
            format!("Failed to copy {} to {}", from.display(), to.display())
        })?;

        let metadata = fs::metadata(from)
            .with_context(|| format!("Failed to read metadata of {}", from.display()))?;
        let mut times = fs::FileTimes::new();
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }

        // The copy already carries the source permissions, which may be read-only.
        #[cfg(unix)]
        let dest = fs::File::open(to);
        #[cfg(windows)]
        let dest = {
            use std::os::windows::fs::OpenOptionsExt;
            const FILE_WRITE_ATTRIBUTES: u32 = 0x100;
            fs::File::options()
                .access_mode(FILE_WRITE_ATTRIBUTES)
                .open(to)
        };
        #[cfg(not(any(unix, windows)))]
        let dest = fs::File::options().write(true).open(to);

        dest.and_then(|file| file.set_times(times))
            .with_context(|| format!("Failed to set file times on {}", to.display()))?;
        Ok(bytes)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_file_impl(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file {}", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).with_context(|| {
            format!(
                "Failed to remove directory and its contents {}",
                path.display()
            )
        })?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn open_impl(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open file {}", path.display()))?;
        Ok(Box::new(file))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn permissions_impl(&self, path: &Path) -> Result<u32> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Ok(metadata.permissions().mode() & 0o7777)
        }
        #[cfg(not(unix))]
        {
            let _ = metadata;
            Ok(0)
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn set_permissions_impl(&self, path: &Path, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(mode);
            fs::set_permissions(path, permissions)
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        {
            let _ = (path, mode); // Suppress unused warnings on non-Unix
        }
        Ok(())
    }
}
