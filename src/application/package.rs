//! Package use case - detects the platform, plans, and applies a release.
//!
//! The flow is strictly sequential:
//! - Platform detection
//! - Planning (all validation happens here)
//! - Binary header inspection (warnings only)
//! - Applying the plan: staging, archiving, checksum manifest

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use serde::Serialize;

use crate::archive::Archiver;
use crate::checksum;
use crate::package::PackageOptions;
use crate::plan::{PackagePlan, Planner, Step};
use crate::platform::{PlatformDetector, binary_arch};
use crate::runtime::Runtime;

/// Result of a completed packaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOutcome {
    pub archive: PathBuf,
    pub sha256: String,
    pub manifest: PathBuf,
}

pub struct PackageUseCase<'a, R: Runtime, A: Archiver, D: PlatformDetector> {
    runtime: &'a R,
    archiver: &'a A,
    detector: &'a D,
}

impl<'a, R: Runtime, A: Archiver, D: PlatformDetector> PackageUseCase<'a, R, A, D> {
    pub fn new(runtime: &'a R, archiver: &'a A, detector: &'a D) -> Self {
        Self {
            runtime,
            archiver,
            detector,
        }
    }

    /// Detect the platform and build the plan without modifying anything.
    pub fn prepare(&self, options: &PackageOptions) -> Result<PackagePlan> {
        let platform = self.detector.detect()?;
        debug!("Detected platform {}", platform);

        let plan = Planner::new(self.runtime).plan(options, &platform)?;
        self.inspect_binaries(&plan);
        Ok(plan)
    }

    /// Prepare and apply in one go.
    pub fn run(&self, options: &PackageOptions) -> Result<PackageOutcome> {
        let plan = self.prepare(options)?;
        self.apply(&plan)
    }

    /// Execute every step of `plan` in order, stopping at the first failure.
    ///
    /// Whatever was staged before a failure stays on disk.
    pub fn apply(&self, plan: &PackagePlan) -> Result<PackageOutcome> {
        info!(
            "Packaging {} {} for {}",
            plan.stage_name, plan.version, plan.platform
        );

        let mut sha256 = None;
        for step in &plan.steps {
            debug!("{}", step);
            if let Some(digest) = self.apply_step(step, plan)? {
                sha256 = Some(digest);
            }
        }

        let sha256 = sha256.ok_or_else(|| anyhow!("plan did not record a checksum"))?;
        info!("Packaged {} ({})", plan.archive_path.display(), sha256);

        Ok(PackageOutcome {
            archive: plan.archive_path.clone(),
            sha256,
            manifest: plan.manifest_path.clone(),
        })
    }

    /// Returns the digest when the step wrote a checksum.
    fn apply_step(&self, step: &Step, plan: &PackagePlan) -> Result<Option<String>> {
        match step {
            Step::CreateDir { path } => self.runtime.create_dir_all(path)?,
            Step::RemoveDir { path } => self.runtime.remove_dir_all(path)?,
            Step::CopyFile { from, to } => {
                self.runtime.copy(from, to)?;
            }
            Step::MarkExecutable { path } => {
                let mode = self.runtime.permissions(path)?;
                self.runtime.set_permissions(path, mode | 0o111)?;
            }
            Step::RemoveFile { path } => self.runtime.remove_file(path)?,
            Step::CreateArchive {
                source, root, dest, ..
            } => self
                .archiver
                .create(source, root, dest)
                .with_context(|| format!("Failed to create archive {}", dest.display()))?,
            Step::WriteChecksum {
                archive,
                manifest,
                mode,
            } => {
                let digest = checksum::sha256_hex(self.runtime, archive)?;
                let file_name = archive
                    .file_name()
                    .ok_or_else(|| anyhow!("archive path has no file name: {:?}", archive))?
                    .to_string_lossy();
                checksum::write_manifest(
                    self.runtime,
                    manifest,
                    &digest,
                    &file_name,
                    *mode,
                    plan.platform.os,
                )?;
                return Ok(Some(digest));
            }
        }
        Ok(None)
    }

    /// Warn about binaries whose header names a different architecture than
    /// the release. The release name is never changed.
    fn inspect_binaries(&self, plan: &PackagePlan) {
        for path in &plan.binaries {
            let mut bytes = Vec::new();
            let read = self
                .runtime
                .open(path)
                .and_then(|mut reader| Ok(reader.read_to_end(&mut bytes)?));
            if let Err(e) = read {
                debug!("Skipping header check of {:?}: {}", path, e);
                continue;
            }

            match binary_arch(&bytes) {
                Some(arch) if arch != plan.platform.arch => warn!(
                    "{} is built for {}, but the release is named for {}",
                    path.display(),
                    arch,
                    plan.platform.arch
                ),
                Some(_) => {}
                None => debug!("Could not determine architecture of {:?}", path),
            }
        }
    }
}
