//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// Release pipeline for the gin command line client
#[derive(Parser, Debug)]
#[command(
    name = "gin-release",
    version,
    about = "Builds, packages, and publishes gin client releases",
    long_about = "Cross-compiles the gin binary for all configured targets, downloads companion \
tools with etag caching, assembles per-platform packages (tar.gz, .deb, macOS bundle, Windows \
zip), and refreshes the 'latest' aliases.

Exit code 0 means the pipeline completed; optional packagers may still have produced nothing \
(check the final report)."
)]
pub struct Args {
    /// Path to the release configuration file (default: release.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the version metadata file
    #[arg(long, value_name = "PATH", default_value = "version")]
    pub version_file: PathBuf,

    /// Output directory override for artifacts and aliases
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Skip companion downloads; dependent packagers are skipped too
    #[arg(long)]
    pub no_download: bool,

    /// Target override as comma-separated os/arch pairs
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub targets: Vec<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        for target in &self.targets {
            if !target.contains('/') {
                return Err(format!(
                    "invalid target: {target}. Targets are os/arch pairs, e.g. linux/amd64"
                ));
            }
        }
        Ok(())
    }
}
