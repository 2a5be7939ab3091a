use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::PackageError;

/// Operating systems a release can be packaged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    /// Map an OS name to its canonical identifier.
    ///
    /// Accepts Rust's `std::env::consts::OS` values as well as the
    /// `darwin`/`win32`/`cygwin` spellings used by other toolchains.
    /// Cygwin counts as Windows.
    pub fn from_name(name: &str) -> Result<Self, PackageError> {
        let lower = name.to_lowercase();
        if lower.starts_with("linux") {
            return Ok(Self::Linux);
        }
        match lower.as_str() {
            "macos" | "darwin" => Ok(Self::Macos),
            "windows" | "win32" | "cygwin" => Ok(Self::Windows),
            _ => Err(PackageError::UnsupportedPlatform {
                platform: name.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }

    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }

    /// Suffix appended to executable file names.
    pub fn exe_suffix(self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }

    pub fn line_ending(self) -> &'static str {
        if self.is_windows() { "\r\n" } else { "\n" }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture identifier.
///
/// Unknown machine names are carried through verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
    Other(String),
}

impl Arch {
    pub fn from_machine(machine: &str) -> Self {
        let lower = machine.to_lowercase();
        match lower.as_str() {
            "x86_64" | "amd64" => Self::X86_64,
            "aarch64" | "arm64" => Self::Aarch64,
            _ => Self::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Arch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Platform information used to name and format a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the current platform
    pub fn detect() -> Result<Self, PackageError> {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_names(os: &str, machine: &str) -> Result<Self, PackageError> {
        Ok(Self {
            os: Os::from_name(os)?,
            arch: Arch::from_machine(machine),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Trait for platform detection (useful for testing)
#[cfg_attr(test, mockall::automock)]
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> Result<Platform, PackageError>;
}

/// Detects the platform this binary was compiled for and is running on
pub struct HostPlatformDetector;

impl PlatformDetector for HostPlatformDetector {
    fn detect(&self) -> Result<Platform, PackageError> {
        Platform::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    fn test_platform_detect() {
        #[cfg(target_os = "linux")]
        let expected_os = Os::Linux;
        #[cfg(target_os = "macos")]
        let expected_os = Os::Macos;
        #[cfg(target_os = "windows")]
        let expected_os = Os::Windows;

        let platform = Platform::detect().unwrap();
        assert_eq!(platform.os, expected_os);
        assert_eq!(platform.arch, Arch::from_machine(std::env::consts::ARCH));
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_platform_detect_x86_64() {
        assert_eq!(Platform::detect().unwrap().arch, Arch::X86_64);
    }

    #[test]
    #[cfg(target_arch = "aarch64")]
    fn test_platform_detect_aarch64() {
        assert_eq!(Platform::detect().unwrap().arch, Arch::Aarch64);
    }

    #[test]
    fn test_os_from_name_known() {
        assert_eq!(Os::from_name("linux").unwrap(), Os::Linux);
        assert_eq!(Os::from_name("linux2").unwrap(), Os::Linux);
        assert_eq!(Os::from_name("macos").unwrap(), Os::Macos);
        assert_eq!(Os::from_name("darwin").unwrap(), Os::Macos);
        assert_eq!(Os::from_name("windows").unwrap(), Os::Windows);
        assert_eq!(Os::from_name("win32").unwrap(), Os::Windows);
        assert_eq!(Os::from_name("cygwin").unwrap(), Os::Windows);
    }

    #[test]
    fn test_os_from_name_unsupported() {
        for name in ["freebsd", "openbsd", "android", "aix", ""] {
            let err = Os::from_name(name).unwrap_err();
            assert_eq!(
                err,
                PackageError::UnsupportedPlatform {
                    platform: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_os_suffix_and_line_ending() {
        assert_eq!(Os::Windows.exe_suffix(), ".exe");
        assert_eq!(Os::Linux.exe_suffix(), "");
        assert_eq!(Os::Macos.exe_suffix(), "");
        assert_eq!(Os::Windows.line_ending(), "\r\n");
        assert_eq!(Os::Linux.line_ending(), "\n");
    }

    #[test]
    fn test_arch_aliases() {
        assert_eq!(Arch::from_machine("x86_64"), Arch::X86_64);
        assert_eq!(Arch::from_machine("AMD64"), Arch::X86_64);
        assert_eq!(Arch::from_machine("aarch64"), Arch::Aarch64);
        assert_eq!(Arch::from_machine("arm64"), Arch::Aarch64);
    }

    #[test]
    fn test_arch_passes_through_unknown() {
        let arch = Arch::from_machine("riscv64");
        assert_eq!(arch, Arch::Other("riscv64".into()));
        assert_eq!(arch.to_string(), "riscv64");
    }

    #[test]
    fn test_platform_display_and_json() {
        let platform = Platform::new(Os::Linux, Arch::X86_64);
        assert_eq!(platform.to_string(), "linux-x86_64");

        let json = serde_json::to_value(&platform).unwrap();
        assert_eq!(json["os"], "linux");
        assert_eq!(json["arch"], "x86_64");
    }

    #[test]
    fn test_host_platform_detector_matches_detect() {
        let detector = HostPlatformDetector;
        assert_eq!(detector.detect(), Platform::detect());
    }
}
