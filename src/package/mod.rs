//! Packaging orchestration.
//!
//! Partitions build artifacts by platform family and drives the per-platform
//! packagers in a strictly sequential loop. A failing packager is logged and
//! its artifact omitted; the run keeps going. The two exceptions are Debian
//! image-build failure (fatal, nothing container-based can be built) and the
//! Debian first-failure rule documented in [`debian`].

pub mod archive;
pub mod checksum;
pub mod debian;
pub mod macos;
pub mod plain;
pub mod platform;
pub mod windows;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::version::VersionInfo;
use platform::{BuildArtifact, PackageArtifact, PackageKind, Platform};

/// Locally available companion downloads. `None` means the download failed
/// or was skipped; packagers that need the input are skipped in turn.
#[derive(Debug, Default)]
pub struct CompanionSet {
    /// macOS application bundle tarball.
    pub macos_bundle: Option<PathBuf>,
    /// Git for Windows portable installer.
    pub git_windows: Option<PathBuf>,
    /// git-annex Windows installer.
    pub annex_windows: Option<PathBuf>,
}

/// Runs every applicable packager over the build artifacts and returns the
/// finished distributables.
pub async fn package_all(
    config: &ReleaseConfig,
    version: &VersionInfo,
    builds: &[BuildArtifact],
    companions: &CompanionSet,
) -> Result<Vec<PackageArtifact>> {
    let mut finished = Vec::new();

    let linux: Vec<&BuildArtifact> = by_platform(builds, Platform::Linux);
    let macos: Vec<&BuildArtifact> = by_platform(builds, Platform::MacOs);
    let windows: Vec<&BuildArtifact> = by_platform(builds, Platform::Windows);

    for build in linux.iter().chain(macos.iter()) {
        let result = match plain::package(config, version, build).await {
            Ok(path) => finalize(path, build, version, PackageKind::Archive).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(artifact) => finished.push(artifact),
            Err(e) => log::warn!("plain archive for {} failed: {e}", build.target.tag()),
        }
    }

    // Image-build failure propagates; it is fatal to the run.
    for (build, path) in debian::package_all(config, version, &linux).await? {
        match finalize(path, build, version, PackageKind::Deb).await {
            Ok(artifact) => finished.push(artifact),
            Err(e) => log::warn!("deb metadata for {} failed: {e}", build.target.tag()),
        }
    }

    match &companions.macos_bundle {
        Some(tarball) => {
            for build in &macos {
                let result = match macos::package(config, version, build, tarball).await {
                    Ok(path) => finalize(path, build, version, PackageKind::Bundle).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(artifact) => finished.push(artifact),
                    Err(e) => log::warn!("bundle for {} failed: {e}", build.target.tag()),
                }
            }
        }
        None if !macos.is_empty() => {
            log::warn!("companion app bundle unavailable, skipping macOS bundles");
        }
        None => {}
    }

    match (&companions.git_windows, &companions.annex_windows) {
        (Some(git), Some(annex)) => {
            for build in &windows {
                let result = match windows::package(config, version, build, git, annex).await {
                    Ok(path) => finalize(path, build, version, PackageKind::Zip).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(artifact) => finished.push(artifact),
                    Err(e) => log::warn!("Windows package for {} failed: {e}", build.target.tag()),
                }
            }
        }
        _ if !windows.is_empty() => {
            log::warn!("Windows companion tools unavailable, skipping Windows packages");
        }
        _ => {}
    }

    Ok(finished)
}

/// Prints the itemized artifact report, grouped by platform and package
/// kind. An artifact missing from this list was skipped or failed.
pub fn report(artifacts: &[PackageArtifact]) {
    if artifacts.is_empty() {
        println!("\nNo artifacts produced.");
        return;
    }

    let mut groups: BTreeMap<&str, Vec<&PackageArtifact>> = BTreeMap::new();
    for artifact in artifacts {
        groups.entry(artifact.platform.os_name()).or_default().push(artifact);
    }

    println!("\nProduced artifacts:");
    for (os, group) in groups {
        println!("  {os}:");
        for artifact in group {
            println!(
                "    [{}] {} ({} bytes, sha256 {})",
                artifact.kind,
                artifact.path.display(),
                artifact.size,
                artifact.checksum
            );
        }
    }
}

fn by_platform(builds: &[BuildArtifact], platform: Platform) -> Vec<&BuildArtifact> {
    builds
        .iter()
        .filter(|b| b.target.platform == platform)
        .collect()
}

/// Wraps a packager's output file into a [`PackageArtifact`] with size and
/// checksum metadata.
async fn finalize(
    path: PathBuf,
    build: &BuildArtifact,
    version: &VersionInfo,
    kind: PackageKind,
) -> Result<PackageArtifact> {
    let size = tokio::fs::metadata(&path).await?.len();
    let checksum = checksum::sha256_file(&path).await?;
    Ok(PackageArtifact {
        path,
        platform: build.target.platform,
        tag: build.target.tag(),
        version: version.version.clone(),
        kind,
        size,
        checksum,
    })
}
