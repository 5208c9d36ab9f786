//! Cache-aware companion tool downloads.
//!
//! A download is skipped entirely when the server's validator token matches
//! the one in the etag ledger and a local file of exactly the reported size
//! already exists. Anything else re-fetches the full body from byte zero;
//! there is no partial resume. Network failure is degraded, not fatal: the
//! caller gets `None` and dependent packaging steps skip that input.

mod ledger;

pub use ledger::{EtagLedger, JsonFileStore, LedgerStore};

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::bail;
use crate::error::Result;

/// Downloader writing into a fixed downloads directory, sharing one etag
/// ledger across all fetches of a run.
pub struct Downloader {
    client: reqwest::Client,
    dir: PathBuf,
    ledger: EtagLedger,
}

impl Downloader {
    /// Creates a downloader writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>, ledger: EtagLedger) -> Self {
        Self {
            client: reqwest::Client::new(),
            dir: dir.into(),
            ledger,
        }
    }

    /// Fetches `url` into the downloads directory.
    ///
    /// The destination filename is `filename` if given, otherwise the last
    /// path segment of the URL. Returns the local path, or `None` when the
    /// transfer failed in a recoverable way (connection error, non-success
    /// status, interrupted body).
    pub async fn fetch(&mut self, url: &str, filename: Option<&str>) -> Result<Option<PathBuf>> {
        let name = match filename {
            Some(name) => name.to_string(),
            None => derived_filename(url)?,
        };
        tokio::fs::create_dir_all(&self.dir).await?;
        let dest = self.dir.join(&name);

        log::info!("downloading {} -> {}", url, dest.display());

        let mut response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("connection to {url} failed: {e}");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            log::warn!("{url} returned status {}", response.status());
            return Ok(None);
        }

        let reported_size = response.content_length();
        let validator = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let local_size = tokio::fs::metadata(&dest).await.ok().map(|m| m.len());
        if is_cached(
            local_size,
            reported_size,
            self.ledger.get(url),
            validator.as_deref(),
        ) {
            log::info!("file already downloaded, skipping");
            return Ok(Some(dest));
        }

        // Full re-fetch: overwrite from byte zero.
        let mut file = tokio::fs::File::create(&dest).await?;
        let mut written: u64 = 0;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                    print_progress(written, reported_size);
                }
                Ok(None) => break,
                Err(e) => {
                    // The ledger keeps its old entry, so the truncated file
                    // can never be mistaken for a finished download.
                    log::warn!("transfer from {url} interrupted: {e}");
                    return Ok(None);
                }
            }
        }
        file.flush().await?;
        println!();

        if let Some(validator) = &validator {
            self.ledger.insert(url, validator);
        }

        Ok(Some(dest))
    }

    /// Consumes the downloader, handing back the ledger for persistence.
    pub fn into_ledger(self) -> EtagLedger {
        self.ledger
    }

    /// The directory downloads are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Cache decision: a transfer can be skipped iff a prior validator exists and
/// matches the current one, and a local file of exactly the reported size is
/// present.
pub fn is_cached(
    local_size: Option<u64>,
    reported_size: Option<u64>,
    stored_validator: Option<&str>,
    current_validator: Option<&str>,
) -> bool {
    match (local_size, reported_size, stored_validator, current_validator) {
        (Some(local), Some(reported), Some(stored), Some(current)) => {
            local == reported && stored == current
        }
        _ => false,
    }
}

fn derived_filename(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| anyhow::anyhow!("bad download URL {url}: {e}"))?;
    let name = parsed
        .path_segments()
        .and_then(|segments| segments.last().map(str::to_string))
        .filter(|s| !s.is_empty());
    match name {
        Some(name) => Ok(name),
        None => bail!("cannot derive a filename from {url}"),
    }
}

fn print_progress(written: u64, total: Option<u64>) {
    match total {
        Some(total) if total > 0 => {
            let percent = written * 100 / total;
            print!("\r  {written}/{total} ({percent}%)");
        }
        _ => print!("\r  {written} bytes"),
    }
    let _ = std::io::stdout().flush();
}
