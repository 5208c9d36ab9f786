//! Packaging orchestration behaviour.

use std::io::Read;
use std::path::Path;

use gin_release::config::ReleaseConfig;
use gin_release::package::platform::{BuildArtifact, PackageKind, Platform, Target};
use gin_release::package::{self, CompanionSet};
use gin_release::version::VersionInfo;

fn version() -> VersionInfo {
    VersionInfo {
        version: "2.3.4-dev".into(),
        build: 42,
        commit: "0123456789abcdef0123456789abcdef01234567".into(),
    }
}

/// Config confined to a scratch directory, with the container-based
/// packager disabled so no Docker is needed.
fn config_in(dir: &Path) -> ReleaseConfig {
    let mut config = ReleaseConfig::default();
    config.output_dir = dir.join("dist");
    config.downloads_dir = dir.join("downloads");
    config.build_dir = dir.join("build");
    config.docs = vec![dir.join("README.md")];
    config.debian.enabled = false;
    config
}

fn fake_binary(dir: &Path, target: &str, name: &str, contents: &str) -> BuildArtifact {
    let target = Target::parse(target).unwrap();
    let path = dir.join("build").join(target.tag()).join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    BuildArtifact { target, path }
}

fn archive_entries(path: &Path) -> Vec<String> {
    let decoder = flate2::read::GzDecoder::new(std::fs::File::open(path).unwrap());
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn plain_archive_follows_the_filename_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(dir.path().join("README.md"), "docs").unwrap();
    let binary = fake_binary(dir.path(), "linux/amd64", "gin", "binary-bytes");

    let artifacts = package::package_all(&config, &version(), &[binary], &CompanionSet::default())
        .await
        .unwrap();

    assert_eq!(artifacts.len(), 1);
    let artifact = &artifacts[0];
    assert_eq!(
        artifact.path.file_name().unwrap().to_str().unwrap(),
        "gin-cli-2.3.4-dev-linux-amd64.tar.gz"
    );
    assert_eq!(artifact.platform, Platform::Linux);
    assert_eq!(artifact.kind, PackageKind::Archive);
    assert_eq!(artifact.version, "2.3.4-dev");
    assert!(artifact.size > 0);
    assert_eq!(artifact.checksum.len(), 64);

    let entries = archive_entries(&artifact.path);
    assert!(entries.contains(&"gin".to_string()));
    assert!(entries.contains(&"README.md".to_string()));
}

#[tokio::test]
async fn packaging_twice_overwrites_with_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(dir.path().join("README.md"), "docs").unwrap();
    let binary = fake_binary(dir.path(), "linux/amd64", "gin", "binary-bytes");
    let info = version();

    let first = package::package_all(&config, &info, &[binary.clone()], &CompanionSet::default())
        .await
        .unwrap();
    let first_bytes = std::fs::read(&first[0].path).unwrap();

    let second = package::package_all(&config, &info, &[binary], &CompanionSet::default())
        .await
        .unwrap();
    let second_bytes = std::fs::read(&second[0].path).unwrap();

    assert_eq!(first[0].path, second[0].path);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn missing_windows_companions_skip_only_windows_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(dir.path().join("README.md"), "docs").unwrap();

    let builds = vec![
        fake_binary(dir.path(), "linux/amd64", "gin", "linux-bytes"),
        fake_binary(dir.path(), "darwin/amd64", "gin", "darwin-bytes"),
        fake_binary(dir.path(), "windows/386", "gin.exe", "windows-bytes"),
    ];

    // Windows companion downloads failed: no inputs for the zip packager.
    let artifacts = package::package_all(&config, &version(), &builds, &CompanionSet::default())
        .await
        .unwrap();

    let windows: Vec<_> = artifacts
        .iter()
        .filter(|a| a.platform == Platform::Windows)
        .collect();
    assert!(windows.is_empty());

    assert!(
        artifacts
            .iter()
            .any(|a| a.platform == Platform::Linux && a.kind == PackageKind::Archive)
    );
    assert!(
        artifacts
            .iter()
            .any(|a| a.platform == Platform::MacOs && a.kind == PackageKind::Archive)
    );
}

#[tokio::test]
async fn plain_archive_preserves_binary_contents() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let binary = fake_binary(dir.path(), "darwin/amd64", "gin", "mac-binary");

    let artifacts = package::package_all(&config, &version(), &[binary], &CompanionSet::default())
        .await
        .unwrap();

    let decoder = flate2::read::GzDecoder::new(std::fs::File::open(&artifacts[0].path).unwrap());
    let mut archive = tar::Archive::new(decoder);
    let mut found = false;
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().to_string_lossy() == "gin" {
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            assert_eq!(contents, "mac-binary");
            found = true;
        }
    }
    assert!(found, "binary entry missing from archive");
}

#[cfg(unix)]
#[test]
fn tar_round_trip_preserves_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("Contents/MacOS")).unwrap();
    std::fs::write(src.join("Contents/MacOS/tool"), "bits").unwrap();
    std::os::unix::fs::symlink("MacOS/tool", src.join("Contents/alias")).unwrap();

    let archive = dir.path().join("out.tar.gz");
    gin_release::package::archive::tar_gz_dir(&src, &archive).unwrap();

    let unpacked = dir.path().join("unpacked");
    gin_release::package::archive::extract_tar_gz(&archive, &unpacked).unwrap();

    let link = unpacked.join("Contents/alias");
    assert!(
        std::fs::symlink_metadata(&link)
            .unwrap()
            .file_type()
            .is_symlink()
    );
    assert_eq!(std::fs::read_to_string(&link).unwrap(), "bits");
}

#[test]
fn target_parsing_rejects_unknown_shapes() {
    assert!(Target::parse("linux/amd64").is_some());
    assert!(Target::parse("darwin/arm64").is_some());
    assert!(Target::parse("plan9/amd64").is_none());
    assert!(Target::parse("linux").is_none());
    assert!(Target::parse("linux/").is_none());

    let target = Target::parse("windows/386").unwrap();
    assert_eq!(target.platform, Platform::Windows);
    assert_eq!(target.tag(), "windows-386");
    assert_eq!(target.osarch(), "windows/386");
}
