use assert_cmd::Command;
use assert_cmd::cargo;
use flate2::read::GzDecoder;
use relpkg::package::{ReleaseVersion, archive_name, binary_name, stage_name};
use relpkg::platform::Platform;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Lay out a fake repository with built binaries and a license.
fn fake_repo(root: &Path, binaries: &[&str]) {
    let platform = Platform::detect().unwrap();
    let release = root.join("target").join("release");
    fs::create_dir_all(&release).unwrap();
    for base in binaries {
        fs::write(release.join(binary_name(base, platform.os)), format!("{base} binary")).unwrap();
    }
    fs::write(root.join("LICENSE"), "MIT License").unwrap();
}

fn relpkg(root: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("relpkg"));
    cmd.current_dir(root)
        .env_remove("CARGO_BUILD_TARGET")
        .env_remove("RELPKG_OUT_DIR")
        .env_remove("RELPKG_ROOT");
    cmd
}

fn expected_stage(version: &str) -> String {
    let platform = Platform::detect().unwrap();
    stage_name("safeparts", &ReleaseVersion::parse(version).unwrap(), &platform)
}

fn expected_archive(root: &Path, version: &str) -> PathBuf {
    let platform = Platform::detect().unwrap();
    root.join("dist")
        .join("release")
        .join(archive_name(&expected_stage(version), platform.os))
}

/// Entry names of a tar.gz or zip archive, without trailing slashes.
fn archive_entries(archive: &Path) -> Vec<String> {
    let file = File::open(archive).unwrap();
    if archive.extension().is_some_and(|e| e == "zip") {
        let zip = zip::ZipArchive::new(file).unwrap();
        zip.file_names().map(String::from).collect()
    } else {
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }
}

#[test]
fn test_end_to_end_package() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts", "safeparts-tui"]);

    let assert = relpkg(&root)
        .args(["--version", "refs/tags/v1.2.3"])
        .assert()
        .success();

    let archive = expected_archive(&root, "1.2.3");
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(PathBuf::from(stdout.trim()), archive);
    assert!(archive.is_file());

    let platform = Platform::detect().unwrap();
    let stage = expected_stage("1.2.3");
    let entries = archive_entries(&archive);
    for name in ["LICENSE", "safeparts", "safeparts-tui"] {
        let file_name = if name == "LICENSE" {
            name.to_string()
        } else {
            binary_name(name, platform.os)
        };
        let entry = format!("{stage}/{file_name}");
        assert!(entries.contains(&entry), "{entry} missing from {entries:?}");
    }

    let manifest = fs::read_to_string(root.join("dist/release/SHA256SUMS.txt")).unwrap();
    let line = manifest.lines().next().unwrap();
    let archive_file = archive.file_name().unwrap().to_string_lossy();
    let (digest, name) = line.split_once("  ").unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    assert_eq!(name, archive_file);
    assert_eq!(manifest.lines().count(), 1);
}

#[test]
fn test_missing_binary_fails_without_output() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts"]);

    relpkg(&root)
        .args(["--version", "1.0.0"])
        .assert()
        .failure()
        .stdout(predicates::str::is_empty())
        .stderr(predicates::str::contains("missing built binaries"))
        .stderr(predicates::str::contains("safeparts-tui"));

    assert!(!root.join("dist").exists());
}

#[test]
fn test_invalid_version_is_rejected() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts", "safeparts-tui"]);

    relpkg(&root)
        .args(["--version", "refs/tags/v"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid version"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts", "safeparts-tui"]);

    let archive = expected_archive(&root, "2.0.0");
    relpkg(&root)
        .args(["--version", "v2.0.0", "--dry-run"])
        .assert()
        .success()
        .stdout(predicates::str::contains("create directory"))
        .stdout(predicates::str::contains(archive.display().to_string()));

    assert!(!root.join("dist").exists());
}

#[test]
fn test_merge_checksums_keeps_previous_archives() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts", "safeparts-tui"]);
    let manifest = root.join("dist").join("release").join("SHA256SUMS.txt");

    relpkg(&root).args(["--version", "1.0.0"]).assert().success();
    relpkg(&root)
        .args(["--version", "1.1.0", "--merge-checksums"])
        .assert()
        .success();

    let merged = fs::read_to_string(&manifest).unwrap();
    assert_eq!(merged.lines().count(), 2);
    assert!(merged.contains(&expected_stage("1.0.0")));
    assert!(merged.contains(&expected_stage("1.1.0")));

    // Without the flag the manifest is rewritten from scratch.
    relpkg(&root).args(["--version", "1.1.0"]).assert().success();
    let overwritten = fs::read_to_string(&manifest).unwrap();
    assert_eq!(overwritten.lines().count(), 1);
}

#[test]
fn test_custom_out_dir_and_json_output() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fake_repo(&root, &["safeparts", "safeparts-tui"]);

    let assert = relpkg(&root)
        .args(["--version", "3.0.0", "--out-dir", "artifacts", "--json"])
        .assert()
        .success();

    let output: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let archive = PathBuf::from(output["archive"].as_str().unwrap());
    assert!(archive.starts_with(root.join("artifacts")));
    assert!(archive.is_file());
    assert_eq!(output["sha256"].as_str().unwrap().len(), 64);
}
