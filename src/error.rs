//! Error types for the release pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version metadata file missing or unparsable. Always fatal.
    #[error("version metadata error in {path}: {reason}")]
    VersionMetadata {
        /// Path of the metadata file
        path: PathBuf,
        /// Reason the file could not be used
        reason: String,
    },

    /// Release configuration errors
    #[error("configuration error: {reason}")]
    Config {
        /// Reason the configuration is unusable
        reason: String,
    },

    /// External command execution failed
    #[error("command failed: {command}: {reason}")]
    Command {
        /// Command that failed
        command: String,
        /// Reason for the failure
        reason: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transfer errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ledger serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Zip archive errors
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Info.plist read/write errors
    #[error("bundle metadata error: {0}")]
    Plist(#[from] plist::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Returns early with a [`ReleaseError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::ReleaseError::Anyhow(::anyhow::anyhow!($($arg)*)))
    };
}
