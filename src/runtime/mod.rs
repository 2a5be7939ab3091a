//! Runtime abstraction for system operations.
//!
//! Every filesystem side effect of a packaging run goes through [`Runtime`],
//! so planning and applying can be tested against [`MockRuntime`] without
//! touching disk.
//!
//! # Structure
//!
//! - `env` - Process environment (current directory)
//! - `fs` - File system operations (read, write, copy, directory, permissions)

mod env;
mod fs;

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Copy a file, carrying over its permission bits and access/modification times.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>>;

    /// Permission bits of a file (`0o7777` mask). Always 0 on Windows.
    fn permissions(&self, path: &Path) -> Result<u32>;

    /// Set file permissions (mode) on Unix systems. No-op on Windows.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.copy_impl(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        self.open_impl(path)
    }

    fn permissions(&self, path: &Path) -> Result<u32> {
        self.permissions_impl(path)
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.set_permissions_impl(path, mode)
    }
}
