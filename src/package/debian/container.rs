//! Docker lifecycle for the Debian builder.
//!
//! The image is built once per run; each binary then gets one container
//! invocation. The container name is fixed, so teardown is unconditional on
//! every exit path and re-attempted defensively at the start of the next
//! run.

use std::path::Path;
use std::time::Duration;

use crate::config::DebianConfig;
use crate::error::Result;
use crate::exec::Exec;

/// Timeout for building the builder image.
const IMAGE_BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Timeout for one in-container packaging run.
const PACKAGE_RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Handle to the builder image for this run.
pub struct DebImage {
    tag: String,
}

impl DebImage {
    /// Builds the builder image from the configured Dockerfile directory.
    ///
    /// # Errors
    ///
    /// A failed image build is fatal to the whole run; without the image no
    /// Debian artifact can be produced and retrying per binary would only
    /// repeat the failure.
    pub async fn build(config: &DebianConfig) -> Result<Self> {
        log::info!("building Docker image {}", config.image);
        Exec::new("docker")
            .args(["build", "-t", config.image.as_str(), "."])
            .current_dir(&config.docker_dir)
            .timeout(IMAGE_BUILD_TIMEOUT)
            .checked()
            .await?;
        Ok(Self {
            tag: config.image.clone(),
        })
    }

    /// Runs one packaging container over a staging tree mounted at `/build`.
    ///
    /// The entrypoint assembles `/build/pkg` into `/build/<output_name>` and
    /// signals failure via a non-zero exit. The container is removed before
    /// this returns, whether packaging succeeded or not.
    pub async fn run_packaging(
        &self,
        config: &DebianConfig,
        staging: &Path,
        output_name: &str,
    ) -> Result<()> {
        let result = Exec::new("docker")
            .arg("run")
            .arg("--name")
            .arg(config.container.as_str())
            .arg("-v")
            .arg(format!("{}:/build", staging.display()))
            .arg("-e")
            .arg(format!("OUTPUT_NAME={output_name}"))
            .arg(self.tag.as_str())
            .timeout(PACKAGE_RUN_TIMEOUT)
            .checked()
            .await;

        remove_container(&config.container).await;
        result
    }
}

/// Removes the builder container if it exists. Failures are ignored; a
/// container that was never created is the common case.
pub async fn remove_container(name: &str) {
    match Exec::new("docker").args(["rm", "-f", name]).capture().await {
        Ok(_) => log::debug!("removed container {name}"),
        Err(e) => log::debug!("container cleanup for {name}: {e}"),
    }
}
