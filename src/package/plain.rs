//! Plain archive packager for Linux and macOS.
//!
//! Copies the binary and any present documentation files into a scratch
//! directory and produces `<product>-<version>-<os>-<arch>.tar.gz`.

use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::package::archive::tar_gz_dir;
use crate::package::platform::BuildArtifact;
use crate::version::VersionInfo;

/// Builds the plain archive for one binary. Re-running overwrites the
/// previous archive for the same version and target.
pub async fn package(
    config: &ReleaseConfig,
    version: &VersionInfo,
    artifact: &BuildArtifact,
) -> Result<PathBuf> {
    let scratch = tempfile::tempdir()?;

    let binary_name = artifact
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.binary.clone());
    copy_executable(&artifact.path, &scratch.path().join(&binary_name)).await?;

    for doc in &config.docs {
        match doc.file_name() {
            Some(name) if doc.is_file() => {
                tokio::fs::copy(doc, scratch.path().join(name)).await?;
            }
            _ => log::debug!("doc file not found, skipping: {}", doc.display()),
        }
    }

    let name = format!(
        "{}-{}-{}.tar.gz",
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

/// Copies a binary, marking it executable.
pub(crate) async fn copy_executable(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(src, dest).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755)).await?;
    }
    Ok(())
}
