//! Packaging plan - what a run will do, computed before anything is touched.
//!
//! [`Planner::plan`] only queries the filesystem (existence checks and the
//! current directory). Every validation failure surfaces here, so a run that
//! fails to plan leaves no trace on disk. The resulting [`PackagePlan`] is
//! executed by [`crate::application::PackageUseCase::apply`] or printed as a
//! dry run.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use log::debug;
use serde::Serialize;

use crate::archive::ArchiveFormat;
use crate::checksum::ManifestMode;
use crate::package::{
    DEFAULT_LICENSE, MANIFEST_FILE_NAME, PackageOptions, ReleaseVersion, archive_name,
    binary_name, default_out_dir, locate_binaries, release_dir, stage_name,
};
use crate::platform::Platform;
use crate::runtime::Runtime;

/// A single filesystem action of a packaging run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    CreateDir {
        path: PathBuf,
    },
    RemoveDir {
        path: PathBuf,
    },
    /// Copy keeping permission bits and timestamps
    CopyFile {
        from: PathBuf,
        to: PathBuf,
    },
    /// OR `0o111` into the file mode
    MarkExecutable {
        path: PathBuf,
    },
    RemoveFile {
        path: PathBuf,
    },
    CreateArchive {
        format: ArchiveFormat,
        source: PathBuf,
        root: String,
        dest: PathBuf,
    },
    WriteChecksum {
        archive: PathBuf,
        manifest: PathBuf,
        mode: ManifestMode,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CreateDir { path } => write!(f, "create directory {}", path.display()),
            Step::RemoveDir { path } => write!(f, "remove directory {}", path.display()),
            Step::CopyFile { from, to } => {
                write!(f, "copy {} -> {}", from.display(), to.display())
            }
            Step::MarkExecutable { path } => write!(f, "chmod +x {}", path.display()),
            Step::RemoveFile { path } => write!(f, "remove file {}", path.display()),
            Step::CreateArchive {
                format,
                source,
                root,
                dest,
            } => write!(
                f,
                "create {} archive {} from {} (as {}/)",
                format,
                dest.display(),
                source.display(),
                root
            ),
            Step::WriteChecksum {
                archive,
                manifest,
                mode,
            } => write!(
                f,
                "write sha256 of {} to {} ({})",
                archive.display(),
                manifest.display(),
                mode
            ),
        }
    }
}

/// Everything a packaging run will produce, plus the ordered steps to get there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackagePlan {
    pub platform: Platform,
    pub version: ReleaseVersion,
    pub out_dir: PathBuf,
    pub stage_name: String,
    pub stage_dir: PathBuf,
    pub archive_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Binaries in the build output
    pub binaries: Vec<PathBuf>,
    pub steps: Vec<Step>,
}

pub struct Planner<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> Planner<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    pub fn plan(&self, options: &PackageOptions, platform: &Platform) -> Result<PackagePlan> {
        let version = ReleaseVersion::parse(&options.version)?;
        if options.binaries.is_empty() {
            bail!("no binaries to package");
        }

        let root = match &options.root {
            Some(root) => self.absolutize(root)?,
            None => self.runtime.current_dir()?,
        };
        let out_dir = match &options.out_dir {
            Some(out_dir) => self.absolutize(out_dir)?,
            None => default_out_dir(&root),
        };

        let os = platform.os;
        let build_dir = release_dir(&root, options.target.as_deref());
        debug!("Looking for binaries in {:?}", build_dir);
        let binaries = locate_binaries(self.runtime, &build_dir, &options.binaries, os)?;

        let stage_name = stage_name(&options.name, &version, platform);
        let stage_dir = out_dir.join(&stage_name);
        let archive_path = out_dir.join(archive_name(&stage_name, os));
        let manifest_path = out_dir.join(MANIFEST_FILE_NAME);

        let mut steps = vec![Step::CreateDir {
            path: out_dir.clone(),
        }];

        if self.runtime.exists(&stage_dir) {
            steps.push(Step::RemoveDir {
                path: stage_dir.clone(),
            });
        }
        steps.push(Step::CreateDir {
            path: stage_dir.clone(),
        });

        let staged: Vec<PathBuf> = options
            .binaries
            .iter()
            .map(|base| stage_dir.join(binary_name(base, os)))
            .collect();
        for (from, to) in binaries.iter().zip(&staged) {
            steps.push(Step::CopyFile {
                from: from.clone(),
                to: to.clone(),
            });
        }

        let license = root.join(&options.license);
        if self.runtime.exists(&license) && !self.runtime.is_dir(&license) {
            let name = options
                .license
                .file_name()
                .unwrap_or(OsStr::new(DEFAULT_LICENSE));
            steps.push(Step::CopyFile {
                from: license.clone(),
                to: stage_dir.join(name),
            });
        } else {
            debug!("No license file at {:?}, skipping", license);
        }

        if !os.is_windows() {
            steps.extend(staged.into_iter().map(|path| Step::MarkExecutable { path }));
        }

        if self.runtime.exists(&archive_path) {
            steps.push(Step::RemoveFile {
                path: archive_path.clone(),
            });
        }
        steps.push(Step::CreateArchive {
            format: ArchiveFormat::for_os(os),
            source: stage_dir.clone(),
            root: stage_name.clone(),
            dest: archive_path.clone(),
        });
        steps.push(Step::WriteChecksum {
            archive: archive_path.clone(),
            manifest: manifest_path.clone(),
            mode: options.manifest_mode,
        });

        Ok(PackagePlan {
            platform: platform.clone(),
            version,
            out_dir,
            stage_name,
            stage_dir,
            archive_path,
            manifest_path,
            binaries,
            steps,
        })
    }

    /// Resolve `path` against the current directory, dropping `.` components.
    fn absolutize(&self, path: &Path) -> Result<PathBuf> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.runtime.current_dir()?.join(path)
        };
        Ok(joined
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }
}
