//! Windows packager.
//!
//! Stages the binary, the extracted Git and git-annex portable installs, and
//! a launch wrapper into one tree, then zips it as
//! `<product>-<version>-windows-<arch>.zip`. The portable installers are
//! self-extracting 7z payloads and are unpacked with the external `7z` tool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;

use crate::bail;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::exec::Exec;
use crate::package::archive::zip_dir;
use crate::package::platform::BuildArtifact;
use crate::version::VersionInfo;

/// Launch wrapper putting the bundled tools on PATH before starting gin.
const WRAPPER_TEMPLATE: &str = "\
@echo off\r
set GINPATH=%~dp0\r
set PATH=%GINPATH%bin;%GINPATH%git\\cmd;%GINPATH%git\\usr\\bin;%GINPATH%git-annex;%PATH%\r
\"%GINPATH%bin\\{{binary}}.exe\" %*\r
";

/// Builds the Windows zip for one binary.
///
/// `git_installer` and `annex_installer` are the downloaded portable
/// installers. Re-running overwrites the previous artifact for the same
/// version and target.
pub async fn package(
    config: &ReleaseConfig,
    version: &VersionInfo,
    artifact: &BuildArtifact,
    git_installer: &Path,
    annex_installer: &Path,
) -> Result<PathBuf> {
    let seven_zip = which::which("7z")
        .map_err(|_| anyhow::anyhow!("7z not found; it is required to unpack portable tools"))?;

    let scratch = tempfile::tempdir()?;
    let stage = scratch.path();

    let binary_name = format!("{}.exe", config.binary);
    let src = &artifact.path;
    if !src.is_file() {
        bail!("binary not found: {}", src.display());
    }
    tokio::fs::create_dir_all(stage.join("bin")).await?;
    tokio::fs::copy(src, stage.join("bin").join(&binary_name)).await?;

    extract_installer(&seven_zip, git_installer, &stage.join("git")).await?;
    extract_installer(&seven_zip, annex_installer, &stage.join("git-annex")).await?;

    let wrapper = render_wrapper(&config.binary)?;
    tokio::fs::write(stage.join(format!("{}.bat", config.binary)), wrapper).await?;

    let name = format!(
        "{}-{}-{}.zip",
        config.product,
        version.version,
        artifact.target.tag()
    );
    let dest = config.output_dir.join(&name);
    tokio::fs::create_dir_all(&config.output_dir).await?;
    zip_dir(stage, &dest)?;

    log::info!("created {}", dest.display());
    Ok(dest)
}

/// Unpacks a self-extracting installer into `dest`.
async fn extract_installer(seven_zip: &Path, installer: &Path, dest: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dest).await?;
    Exec::new(seven_zip.to_string_lossy())
        .args([
            "x".to_string(),
            installer.to_string_lossy().into_owned(),
            format!("-o{}", dest.display()),
            "-y".to_string(),
        ])
        .checked()
        .await
}

fn render_wrapper(binary: &str) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("wrapper", WRAPPER_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("registering wrapper template: {e}"))?;
    let mut data = BTreeMap::new();
    data.insert("binary", binary.to_string());
    handlebars
        .render("wrapper", &data)
        .map_err(|e| anyhow::anyhow!("rendering wrapper template: {e}").into())
}
