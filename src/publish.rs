//! Stable `latest` aliases for the newest artifacts.
//!
//! Each alias is a hard link created in a single filesystem operation, so a
//! concurrent directory listing never observes a half-written alias. The
//! alias is missing only during the brief removal of its predecessor.

use std::path::PathBuf;

use crate::error::Result;
use crate::package::platform::PackageArtifact;

/// Computes the alias filename by substituting the literal version string
/// with `latest`. Returns `None` when the filename does not embed the
/// version.
pub fn alias_name(file_name: &str, version: &str) -> Option<String> {
    if version.is_empty() || !file_name.contains(version) {
        return None;
    }
    Some(file_name.replacen(version, "latest", 1))
}

/// Creates or replaces the `latest` alias for every artifact of this run.
///
/// A single artifact's alias failure is logged and skipped; the others are
/// still published.
pub async fn publish_latest(artifacts: &[PackageArtifact]) -> Result<Vec<PathBuf>> {
    let mut aliases = Vec::new();
    for artifact in artifacts {
        match publish_one(artifact).await {
            Ok(Some(alias)) => aliases.push(alias),
            Ok(None) => log::warn!(
                "cannot derive alias for {}: version not in filename",
                artifact.path.display()
            ),
            Err(e) => log::warn!("alias for {} failed: {e}", artifact.path.display()),
        }
    }
    Ok(aliases)
}

async fn publish_one(artifact: &PackageArtifact) -> Result<Option<PathBuf>> {
    let file_name = match artifact.path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return Ok(None),
    };
    let Some(alias) = alias_name(&file_name, &artifact.version) else {
        return Ok(None);
    };
    let alias_path = match artifact.path.parent() {
        Some(parent) => parent.join(alias),
        None => PathBuf::from(alias),
    };

    match tokio::fs::remove_file(&alias_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    tokio::fs::hard_link(&artifact.path, &alias_path).await?;

    log::info!("latest alias: {}", alias_path.display());
    Ok(Some(alias_path))
}
