use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, info};
use std::fs::File;
use std::path::Path;
use walkdir::WalkDir;

use super::{Archiver, entry_name};

/// Archiver for .tar.gz files
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    fn create(&self, source_dir: &Path, root_name: &str, archive_path: &Path) -> Result<()> {
        debug!("Creating tar.gz archive {:?} from {:?}", archive_path, source_dir);
        let file = File::create(archive_path)
            .with_context(|| format!("Failed to create archive at {:?}", archive_path))?;
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        // Sorted walk keeps the entry order stable across runs.
        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk directory {:?}", source_dir))?;
            let rel = entry.path().strip_prefix(source_dir)?;
            let name = entry_name(root_name, rel);

            if entry.file_type().is_dir() {
                builder
                    .append_dir(&name, entry.path())
                    .with_context(|| format!("Failed to add directory {:?}", entry.path()))?;
            } else {
                debug!("Adding {}", name);
                builder
                    .append_path_with_name(entry.path(), &name)
                    .with_context(|| format!("Failed to add file {:?}", entry.path()))?;
            }
        }

        let encoder = builder
            .into_inner()
            .with_context(|| format!("Failed to finish tar stream for {:?}", archive_path))?;
        encoder
            .finish()
            .with_context(|| format!("Failed to finish gzip stream for {:?}", archive_path))?;

        info!("Created {}", archive_path.display());
        Ok(())
    }
}
