//! Platform detection module
//!
//! This module maps the running operating system and CPU architecture to
//! the canonical identifiers used in release file names, and inspects
//! built binaries to see which architecture they were compiled for.

mod detection;
mod inspect;

pub use detection::{Arch, HostPlatformDetector, Os, Platform, PlatformDetector};
pub use inspect::binary_arch;

#[cfg(test)]
pub use detection::MockPlatformDetector;
