//! Target platform types and artifact records.

use std::fmt;
use std::path::PathBuf;

/// Operating system family of a build target.
///
/// Attached to every [`BuildArtifact`] at creation, so packaging dispatch
/// never inspects filenames.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    /// Linux targets
    Linux,
    /// macOS targets (named `darwin` in target strings and filenames)
    MacOs,
    /// Windows targets
    Windows,
}

impl Platform {
    /// Parses the OS half of an `os/arch` target string.
    pub fn parse(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Self::Linux),
            "darwin" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// OS segment used in directory and artifact names.
    pub fn os_name(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.os_name())
    }
}

/// One cross-compilation target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// Operating system family.
    pub platform: Platform,
    /// Architecture name as the backend knows it, e.g. `amd64`, `386`.
    pub arch: String,
}

impl Target {
    /// Parses an `os/arch` pair such as `linux/amd64`.
    pub fn parse(target: &str) -> Option<Self> {
        let (os, arch) = target.split_once('/')?;
        if arch.is_empty() {
            return None;
        }
        Some(Self {
            platform: Platform::parse(os)?,
            arch: arch.to_string(),
        })
    }

    /// The `os-arch` tag embedded in directory and artifact names.
    pub fn tag(&self) -> String {
        format!("{}-{}", self.platform, self.arch)
    }

    /// The `os/arch` form the compilation backend expects.
    pub fn osarch(&self) -> String {
        format!("{}/{}", self.platform, self.arch)
    }
}

/// A compiled binary for one target.
#[derive(Clone, Debug)]
pub struct BuildArtifact {
    /// The target this binary was compiled for.
    pub target: Target,
    /// Location of the binary on disk.
    pub path: PathBuf,
}

/// Kind of distributable a packager produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackageKind {
    /// Plain compressed tar archive
    Archive,
    /// Debian package
    Deb,
    /// macOS application bundle tarball
    Bundle,
    /// Windows zip
    Zip,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Archive => "archive",
            Self::Deb => "deb",
            Self::Bundle => "bundle",
            Self::Zip => "zip",
        };
        f.write_str(name)
    }
}

/// One finished distributable. Immutable once written.
#[derive(Clone, Debug)]
pub struct PackageArtifact {
    /// Location of the file in the output directory.
    pub path: PathBuf,
    /// Platform family the artifact targets.
    pub platform: Platform,
    /// The `os-arch` tag of the binary that went in.
    pub tag: String,
    /// Version string embedded in the filename.
    pub version: String,
    /// Package kind, for the grouped report.
    pub kind: PackageKind,
    /// Size in bytes.
    pub size: u64,
    /// SHA-256 of the file contents.
    pub checksum: String,
}
