//! SHA-256 checksums and the `SHA256SUMS.txt` manifest.
//!
//! Manifest lines use the `sha256sum` layout: `<hex-digest>  <file-name>`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::platform::Os;
use crate::runtime::Runtime;

/// Read size used while hashing; memory use stays bounded by this.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// How an existing manifest is treated when a new checksum is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMode {
    /// Replace the manifest with a single line for this archive.
    #[default]
    Overwrite,
    /// Keep lines for other archives, replace the line for this one.
    Merge,
}

impl fmt::Display for ManifestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => f.write_str("overwrite"),
            Self::Merge => f.write_str("merge"),
        }
    }
}

/// Hex-encoded SHA-256 of a file, streamed in [`CHUNK_SIZE`] chunks.
pub fn sha256_hex<R: Runtime>(runtime: &R, path: &Path) -> Result<String> {
    let mut reader = runtime
        .open(path)
        .with_context(|| format!("Failed to open {:?} for hashing", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {:?} for hashing", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn manifest_line(digest: &str, file_name: &str, os: Os) -> String {
    format!("{}  {}{}", digest, file_name, os.line_ending())
}

/// Parse a manifest line into `(digest, file_name)`.
///
/// Lines that do not carry a 64-char lowercase hex digest are rejected.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (digest, name) = line.split_once("  ")?;
    let valid_digest = digest.len() == 64
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    (valid_digest && !name.is_empty()).then_some((digest, name))
}

/// Manifest content after recording `digest` for `file_name`.
pub fn render_manifest(
    existing: Option<&str>,
    digest: &str,
    file_name: &str,
    mode: ManifestMode,
    os: Os,
) -> String {
    match mode {
        ManifestMode::Overwrite => manifest_line(digest, file_name, os),
        ManifestMode::Merge => {
            let mut entries: BTreeMap<&str, &str> = BTreeMap::new();
            for line in existing.unwrap_or_default().lines() {
                let line = line.trim_end_matches('\r');
                match parse_line(line) {
                    Some((d, n)) => {
                        entries.insert(n, d);
                    }
                    None if !line.trim().is_empty() => {
                        debug!("Dropping malformed manifest line: {:?}", line);
                    }
                    None => {}
                }
            }
            entries.insert(file_name, digest);
            entries
                .into_iter()
                .map(|(n, d)| manifest_line(d, n, os))
                .collect()
        }
    }
}

/// Write the manifest at `manifest_path` recording `digest` for `file_name`.
pub fn write_manifest<R: Runtime>(
    runtime: &R,
    manifest_path: &Path,
    digest: &str,
    file_name: &str,
    mode: ManifestMode,
    os: Os,
) -> Result<()> {
    let existing = match mode {
        ManifestMode::Merge if runtime.exists(manifest_path) => Some(
            runtime
                .read_to_string(manifest_path)
                .with_context(|| format!("Failed to read manifest {:?}", manifest_path))?,
        ),
        _ => None,
    };

    let content = render_manifest(existing.as_deref(), digest, file_name, mode, os);
    runtime
        .write(manifest_path, content.as_bytes())
        .with_context(|| format!("Failed to write manifest {:?}", manifest_path))
}
