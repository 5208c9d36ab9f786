//! Release pipeline for the gin command line client.
//!
//! This library automates building and packaging the multi-platform gin
//! binary for distribution:
//! - cross-compiles for every configured target in one backend invocation
//! - fetches third-party companion tools through an etag-cached downloader
//! - assembles plain archives, a Debian package (inside a container), a
//!   macOS application bundle, and a Windows zip
//! - publishes hard-linked `latest` aliases for the newest artifacts
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod build;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod exec;
pub mod package;
pub mod publish;
pub mod version;

// Re-export commonly used types
pub use error::{ReleaseError, Result};
pub use version::VersionInfo;
