//! Cross-compilation of the product binary.
//!
//! The backend (`gox`) is invoked exactly once per run with the full target
//! list. Version, build number, and commit id are injected as link-time
//! constants so every binary can self-report its provenance.

use std::path::PathBuf;

use crate::bail;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::exec::Exec;
use crate::package::platform::{BuildArtifact, Platform, Target};
use crate::version::VersionInfo;

/// Cross-compiles for every configured target.
///
/// Returns one [`BuildArtifact`] per target, each tagged with its platform
/// from the target list itself. A backend failure is fatal: no usable
/// partial platform set exists without binaries.
pub async fn cross_compile(
    config: &ReleaseConfig,
    version: &VersionInfo,
) -> Result<Vec<BuildArtifact>> {
    let targets = config.parsed_targets()?;

    let backend = which::which("gox")
        .map_err(|_| anyhow::anyhow!("gox not found; install it to cross-compile"))?;

    let osarch: Vec<String> = targets.iter().map(Target::osarch).collect();
    let ldflags = format!(
        "-X main.version={} -X main.build={} -X main.commit={}",
        version.version, version.build, version.commit
    );
    let output_template = format!(
        "{}/{{{{.OS}}}}-{{{{.Arch}}}}/{}",
        config.build_dir.display(),
        config.binary
    );

    log::info!("building binaries for [{}]", osarch.join(" "));
    Exec::new(backend.to_string_lossy())
        .arg(format!("-osarch={}", osarch.join(" ")))
        .arg("-ldflags")
        .arg(ldflags)
        .arg(format!("-output={output_template}"))
        .checked()
        .await?;
    log::info!("build succeeded");

    let mut artifacts = Vec::with_capacity(targets.len());
    for target in targets {
        let path = binary_path(config, &target);
        if !path.is_file() {
            bail!("backend reported success but {} is missing", path.display());
        }
        artifacts.push(BuildArtifact { target, path });
    }

    self_report(config, &artifacts).await;
    Ok(artifacts)
}

/// Expected output location for one target, following the backend's
/// OS-arch directory convention.
fn binary_path(config: &ReleaseConfig, target: &Target) -> PathBuf {
    let mut name = config.binary.clone();
    if target.platform == Platform::Windows {
        name.push_str(".exe");
    }
    config.build_dir.join(target.tag()).join(name)
}

/// Runs the host-platform binary with `--version` and logs what it reports.
/// Purely informational; a failure here does not fail the build.
async fn self_report(config: &ReleaseConfig, artifacts: &[BuildArtifact]) {
    let host = if cfg!(target_os = "linux") {
        Platform::Linux
    } else if cfg!(target_os = "macos") {
        Platform::MacOs
    } else {
        Platform::Windows
    };

    let Some(native) = artifacts.iter().find(|a| a.target.platform == host) else {
        return;
    };
    match Exec::new(native.path.to_string_lossy())
        .arg("--version")
        .capture()
        .await
    {
        Ok(reported) => log::info!("{} --version: {reported}", config.binary),
        Err(e) => log::warn!("binary version self-report failed: {e}"),
    }
}
