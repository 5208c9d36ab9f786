//! Release configuration.
//!
//! Configuration is read from `release.toml`. Every field has a default
//! matching the gin-cli release layout, so a missing or empty file produces a
//! fully working configuration. CLI flags override individual fields after
//! loading.

use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};
use crate::package::platform::Target;

/// Top-level release configuration.
///
/// # Configuration
///
/// ```toml
/// product = "gin-cli"
/// binary = "gin"
/// targets = ["linux/amd64", "windows/386", "darwin/amd64"]
/// output_dir = "dist"
///
/// [companions]
/// git_windows = "https://github.com/git-for-windows/git/releases/download/v2.12.0.windows.1/PortableGit-2.12.0-32-bit.7z.exe"
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Product name embedded in every artifact filename.
    pub product: String,

    /// Name of the compiled binary (without extension).
    pub binary: String,

    /// Cross-compilation targets as `os/arch` pairs.
    ///
    /// Recognized OS values: `linux`, `darwin`, `windows`.
    pub targets: Vec<String>,

    /// Directory receiving finished artifacts and their `latest` aliases.
    pub output_dir: PathBuf,

    /// Directory for downloaded companion tools and the etag ledger.
    pub downloads_dir: PathBuf,

    /// Directory the compilation backend writes binaries into.
    pub build_dir: PathBuf,

    /// Documentation files copied into plain archives, if present.
    pub docs: Vec<PathBuf>,

    /// Directory with optional packaging assets (icon, readme swaps).
    pub assets_dir: PathBuf,

    /// Companion tool download URLs.
    pub companions: CompanionUrls,

    /// Debian packaging settings.
    pub debian: DebianConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            product: "gin-cli".into(),
            binary: "gin".into(),
            targets: vec![
                "linux/amd64".into(),
                "windows/386".into(),
                "darwin/amd64".into(),
            ],
            output_dir: "dist".into(),
            downloads_dir: "downloads".into(),
            build_dir: "build".into(),
            docs: vec!["README.md".into(), "LICENSE".into()],
            assets_dir: "packaging".into(),
            companions: CompanionUrls::default(),
            debian: DebianConfig::default(),
        }
    }
}

/// Download locations for third-party companion tools.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanionUrls {
    /// macOS application bundle shell the binary is relocated into.
    pub macos_bundle: String,

    /// Git for Windows portable self-extracting archive.
    pub git_windows: String,

    /// git-annex installer for Windows.
    pub annex_windows: String,
}

impl Default for CompanionUrls {
    fn default() -> Self {
        Self {
            macos_bundle:
                "https://downloads.kitenet.net/git-annex/OSX/current/10.10_Yosemite/git-annex.app.tar.gz"
                    .into(),
            git_windows:
                "https://github.com/git-for-windows/git/releases/download/v2.12.0.windows.1/PortableGit-2.12.0-32-bit.7z.exe"
                    .into(),
            annex_windows:
                "https://downloads.kitenet.net/git-annex/windows/current/git-annex-installer.exe"
                    .into(),
        }
    }
}

/// Settings for the container-assembled Debian package.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebianConfig {
    /// Whether to build Debian packages at all.
    ///
    /// Disabling skips the container lifecycle entirely; the run still
    /// succeeds with an empty Debian artifact list.
    pub enabled: bool,

    /// Docker image tag for the builder image.
    pub image: String,

    /// Fixed container name. One container identity per host; this is why
    /// Debian builds never run concurrently.
    pub container: String,

    /// Directory containing the builder image's Dockerfile.
    pub docker_dir: PathBuf,

    /// Install prefix inside the package.
    pub prefix: String,

    /// Maintainer line for the control file.
    pub maintainer: String,

    /// Short package description for the control file.
    pub description: String,
}

impl Default for DebianConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: "gin-deb".into(),
            container: "gin-deb-build".into(),
            docker_dir: "docker".into(),
            prefix: "/opt/gin".into(),
            maintainer: "G-Node <dev@g-node.org>".into(),
            description: "Command line client for the GIN data management service".into(),
        }
    }
}

impl ReleaseConfig {
    /// Loads configuration from `path`, or from `release.toml` if no path is
    /// given. An explicitly named file must exist; the default location may
    /// be absent, in which case defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from("release.toml"), false),
        };

        if !file.exists() {
            if required {
                return Err(ReleaseError::Config {
                    reason: format!("configuration file not found: {}", file.display()),
                });
            }
            log::debug!("no release.toml found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&file)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the configured target list into typed targets.
    pub fn parsed_targets(&self) -> Result<Vec<Target>> {
        self.targets
            .iter()
            .map(|t| {
                Target::parse(t).ok_or_else(|| ReleaseError::Config {
                    reason: format!("unrecognized target: {t}"),
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ReleaseError::Config {
                reason: "target list is empty".into(),
            });
        }
        self.parsed_targets().map(|_| ())
    }
}
