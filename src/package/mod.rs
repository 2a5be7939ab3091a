//! Release naming and build output layout
//!
//! This module knows how a release is named (version normalization,
//! staging directory and archive names) and where the external build
//! leaves the binaries that go into it.

mod artifacts;
mod layout;
mod options;
mod version;

pub use artifacts::locate_binaries;
pub use layout::{
    MANIFEST_FILE_NAME, archive_name, binary_name, default_out_dir, release_dir, stage_name,
};
pub use options::{DEFAULT_BINARIES, DEFAULT_LICENSE, DEFAULT_TOOL_NAME, PackageOptions};
pub use version::{ReleaseVersion, normalize};
