//! macOS application bundle packager.
//!
//! Unpacks the downloaded companion app bundle, moves the product binary
//! into its executable directory, rewrites the bundle version metadata, and
//! re-archives the result as
//! `<product>-<version>-darwin-<arch>-bundle.tar.gz`.

use std::path::{Path, PathBuf};

use crate::bail;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::package::archive::{extract_tar_gz, tar_gz_dir};
use crate::package::plain::copy_executable;
use crate::package::platform::BuildArtifact;
use crate::version::VersionInfo;

/// Builds the bundle artifact for one macOS binary.
///
/// `app_tarball` is the downloaded companion bundle archive. Re-running
/// overwrites the previous artifact for the same version and target.
pub async fn package(
    config: &ReleaseConfig,
    version: &VersionInfo,
    artifact: &BuildArtifact,
    app_tarball: &Path,
) -> Result<PathBuf> {
    let scratch = tempfile::tempdir()?;
    extract_tar_gz(app_tarball, scratch.path())?;

    let app_dir = find_app_dir(scratch.path())?;

    copy_executable(
        &artifact.path,
        &app_dir.join("Contents/MacOS").join(&config.binary),
    )
    .await?;

    rewrite_bundle_versions(&app_dir.join("Contents/Info.plist"), version)?;
    swap_assets(config, &app_dir).await?;

    let name = format!(
        "{}-{}-{}-bundle.tar.gz",
        config.product,
        version.version,
        artifact.target.tag()
    );
    let dest = config.output_dir.join(&name);
    tokio::fs::create_dir_all(&config.output_dir).await?;
    tar_gz_dir(scratch.path(), &dest)?;

    log::info!("created {}", dest.display());
    Ok(dest)
}

/// Locates the single `*.app` directory at the top of the unpacked archive.
fn find_app_dir(root: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.extension().and_then(|e| e.to_str()) == Some("app") {
            return Ok(path);
        }
    }
    bail!("no .app directory found in companion bundle");
}

/// Sets the bundle's version fields to the resolved release version.
fn rewrite_bundle_versions(info_plist: &Path, version: &VersionInfo) -> Result<()> {
    let mut value = plist::Value::from_file(info_plist)?;
    let dict = match value.as_dictionary_mut() {
        Some(dict) => dict,
        None => bail!("Info.plist root is not a dictionary"),
    };
    dict.insert(
        "CFBundleShortVersionString".into(),
        plist::Value::String(version.version.clone()),
    );
    dict.insert(
        "CFBundleVersion".into(),
        plist::Value::String(version.build.to_string()),
    );
    value.to_file_xml(info_plist)?;
    Ok(())
}

/// Replaces the bundle icon and readme with release assets, when present
/// under the assets directory.
async fn swap_assets(config: &ReleaseConfig, app_dir: &Path) -> Result<()> {
    let icon = config.assets_dir.join("icon.icns");
    if icon.is_file() {
        let resources = app_dir.join("Contents/Resources");
        tokio::fs::create_dir_all(&resources).await?;
        tokio::fs::copy(&icon, resources.join("icon.icns")).await?;
        log::debug!("replaced bundle icon");
    }

    for doc in &config.docs {
        if let Some(name) = doc.file_name() {
            if doc.is_file() {
                tokio::fs::copy(doc, app_dir.join(name)).await?;
            }
        }
    }
    Ok(())
}
