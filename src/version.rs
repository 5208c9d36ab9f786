//! Version resolution from repository metadata.
//!
//! The released version string comes from the `version` file; the build
//! number and commit id come from the git history, so neither can be set by
//! hand and the build number never regresses.

use std::fmt;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::exec::Exec;

/// Immutable version record for one release run.
///
/// Created once, then read by every downstream component for artifact naming
/// and link-time embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Release version string, e.g. `2.3.4-dev`.
    pub version: String,
    /// Number of commits in the history. Strictly monotonic across runs.
    pub build: u64,
    /// Commit id of the current history tip.
    pub commit: String,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version {} build {} commit {}",
            self.version, self.build, self.commit
        )
    }
}

/// Resolves the version record for the repository at `repo_dir`.
///
/// # Arguments
///
/// * `version_file` - Plain `key=value` metadata file with a `version=` field
/// * `repo_dir` - Repository the build count and commit id are read from
///
/// # Errors
///
/// A missing metadata file, an absent or empty `version=` field, or a failing
/// git query are all fatal. There is no fallback version.
pub async fn resolve(version_file: &Path, repo_dir: &Path) -> Result<VersionInfo> {
    let metadata =
        std::fs::read_to_string(version_file).map_err(|e| ReleaseError::VersionMetadata {
            path: version_file.to_path_buf(),
            reason: e.to_string(),
        })?;

    let version = parse_version_field(&metadata).ok_or_else(|| ReleaseError::VersionMetadata {
        path: version_file.to_path_buf(),
        reason: "no parsable version= field".into(),
    })?;

    let count = Exec::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .current_dir(repo_dir)
        .capture()
        .await?;
    let build = count
        .parse::<u64>()
        .map_err(|e| ReleaseError::VersionMetadata {
            path: version_file.to_path_buf(),
            reason: format!("bad commit count {count:?}: {e}"),
        })?;

    let commit = Exec::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_dir)
        .capture()
        .await?;

    Ok(VersionInfo {
        version,
        build,
        commit,
    })
}

/// Extracts the `version=` value from key=value metadata text.
///
/// Returns `None` when the field is missing or empty.
pub fn parse_version_field(metadata: &str) -> Option<String> {
    metadata
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "version")
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}
