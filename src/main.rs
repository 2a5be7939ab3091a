use anyhow::Result;
use clap::Parser;
use relpkg::application::PackageUseCase;
use relpkg::archive::ArchiverImpl;
use relpkg::checksum::ManifestMode;
use relpkg::package::{DEFAULT_BINARIES, DEFAULT_LICENSE, DEFAULT_TOOL_NAME, PackageOptions};
use relpkg::platform::HostPlatformDetector;
use relpkg::runtime::RealRuntime;
use std::path::PathBuf;

/// relpkg - package release binaries for distribution
///
/// Stages the release binaries and the license into a versioned directory,
/// archives it (zip on Windows, tar.gz elsewhere), writes SHA256SUMS.txt next
/// to the archive and prints the absolute archive path.
///
/// Examples:
///   relpkg --version v1.2.3
///   relpkg --version 1.2.3 --target x86_64-unknown-linux-musl
#[derive(Parser, Debug)]
#[command(
    author,
    about,
    disable_version_flag = true,
    after_help = concat!("relpkg ", env!("RELPKG_VERSION"))
)]
struct Cli {
    /// Release version (`1.2.3`, `v1.2.3` or `refs/tags/v1.2.3`)
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Cross-compilation target triple (looks in target/<TRIPLE>/release)
    #[arg(long, env = "CARGO_BUILD_TARGET", value_name = "TRIPLE")]
    pub target: Option<String>,

    /// Output directory (defaults to <ROOT>/dist/release)
    #[arg(long = "out-dir", env = "RELPKG_OUT_DIR", value_name = "PATH")]
    pub out_dir: Option<PathBuf>,

    /// Repository root (defaults to the current directory)
    #[arg(long, env = "RELPKG_ROOT", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Tool name used in the release name
    #[arg(long, value_name = "NAME", default_value = DEFAULT_TOOL_NAME)]
    pub name: String,

    /// Binary to package; repeat for several
    #[arg(
        long = "bin",
        value_name = "NAME",
        default_values_t = DEFAULT_BINARIES.map(String::from)
    )]
    pub binaries: Vec<String>,

    /// License file, relative to the root; skipped when absent
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LICENSE)]
    pub license: PathBuf,

    /// Keep checksums of other archives already in SHA256SUMS.txt
    #[arg(long = "merge-checksums")]
    pub merge_checksums: bool,

    /// Print what would be done without touching the filesystem
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the result as JSON instead of the bare archive path
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    fn options(&self) -> PackageOptions {
        PackageOptions {
            version: self.version.clone(),
            root: self.root.clone(),
            target: self.target.clone().filter(|t| !t.is_empty()),
            out_dir: self.out_dir.clone(),
            name: self.name.clone(),
            binaries: self.binaries.clone(),
            license: self.license.clone(),
            manifest_mode: if self.merge_checksums {
                ManifestMode::Merge
            } else {
                ManifestMode::Overwrite
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let runtime = RealRuntime;
    let archiver = ArchiverImpl::new();
    let detector = HostPlatformDetector;
    let use_case = PackageUseCase::new(&runtime, &archiver, &detector);
    let options = cli.options();

    if cli.dry_run {
        let plan = use_case.prepare(&options)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            for step in &plan.steps {
                println!("{}", step);
            }
            println!("{}", plan.archive_path.display());
        }
        return Ok(());
    }

    let outcome = use_case.run(&options)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.archive.display());
    }
    Ok(())
}
