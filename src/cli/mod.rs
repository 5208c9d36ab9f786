//! Command line interface and pipeline driver.
//!
//! The pipeline is strictly sequential: resolve version, cross-compile,
//! download companions, package per platform, publish aliases. The only
//! shared mutable state is the etag ledger, loaded once and persisted once.

mod args;

pub use args::Args;

use std::path::Path;

use crate::build;
use crate::config::ReleaseConfig;
use crate::download::{Downloader, EtagLedger, JsonFileStore};
use crate::error::{ReleaseError, Result};
use crate::package::{self, CompanionSet};
use crate::publish;
use crate::version;

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    if let Err(reason) = args.validate() {
        return Err(ReleaseError::Config { reason });
    }

    let mut config = ReleaseConfig::load(args.config.as_deref())?;
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if !args.targets.is_empty() {
        config.targets = args.targets.clone();
        config.parsed_targets()?;
    }

    let version = version::resolve(&args.version_file, Path::new(".")).await?;
    log::info!("{version}");

    let builds = build::cross_compile(&config, &version).await?;

    let companions = if args.no_download {
        log::info!("downloads disabled, dependent packagers will be skipped");
        CompanionSet::default()
    } else {
        download_companions(&config).await?
    };

    let artifacts = package::package_all(&config, &version, &builds, &companions).await?;
    package::report(&artifacts);
    publish::publish_latest(&artifacts).await?;

    Ok(0)
}

/// Fetches all companion tools through one cache-aware downloader, then
/// persists the ledger wholesale.
async fn download_companions(config: &ReleaseConfig) -> Result<CompanionSet> {
    let store = JsonFileStore::in_dir(&config.downloads_dir);
    let ledger = EtagLedger::load(Box::new(store))?;
    let mut downloader = Downloader::new(config.downloads_dir.clone(), ledger);

    let macos_bundle = downloader
        .fetch(&config.companions.macos_bundle, None)
        .await?;
    let git_windows = downloader
        .fetch(&config.companions.git_windows, Some("git-for-windows.exe"))
        .await?;
    let annex_windows = downloader
        .fetch(&config.companions.annex_windows, None)
        .await?;

    downloader.into_ledger().persist()?;

    Ok(CompanionSet {
        macos_bundle,
        git_windows,
        annex_windows,
    })
}
