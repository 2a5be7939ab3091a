use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::{File, Metadata};
use std::path::Path;
use time::OffsetDateTime;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{Archiver, entry_name};

/// Archiver for .zip files
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".zip")
    }

    fn create(&self, source_dir: &Path, root_name: &str, archive_path: &Path) -> Result<()> {
        debug!("Creating zip archive {:?} from {:?}", archive_path, source_dir);
        let file = File::create(archive_path)
            .with_context(|| format!("Failed to create archive at {:?}", archive_path))?;
        let mut zip = ZipWriter::new(file);

        // Directories get no entry of their own; file paths imply them.
        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk directory {:?}", source_dir))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let rel = entry.path().strip_prefix(source_dir)?;
            let name = entry_name(root_name, rel);

            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to read metadata of {:?}", entry.path()))?;

            let mut options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(needs_zip64(metadata.len()));
            if let Some(mtime) = entry_mtime(&metadata) {
                options = options.last_modified_time(mtime);
            }
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                options = options.unix_permissions(metadata.permissions().mode() & 0o7777);
            }

            debug!("Adding {}", name);
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("Failed to start ZIP entry {}", name))?;
            let mut source = File::open(entry.path())
                .with_context(|| format!("Failed to open {:?}", entry.path()))?;
            std::io::copy(&mut source, &mut zip)
                .with_context(|| format!("Failed to write ZIP entry {}", name))?;
        }

        zip.finish()
            .with_context(|| format!("Failed to finish archive {:?}", archive_path))?;

        info!("Created {}", archive_path.display());
        Ok(())
    }
}

/// Entries this large do not fit the 32-bit size fields of a plain zip.
fn needs_zip64(len: u64) -> bool {
    len >= u32::MAX as u64
}

/// Modification time of a staged file as a zip timestamp (UTC).
///
/// Times outside the DOS range (before 1980 or after 2107) fall back to
/// the zip default.
fn entry_mtime(metadata: &Metadata) -> Option<DateTime> {
    let modified = metadata.modified().ok()?;
    match DateTime::try_from(OffsetDateTime::from(modified)) {
        Ok(mtime) => Some(mtime),
        Err(e) => {
            debug!("Keeping default zip timestamp: {}", e);
            None
        }
    }
}
