//! Debian packager.
//!
//! Assembles a staging filesystem tree per binary and has a Docker container
//! turn it into a `.deb`, keeping dpkg tooling off the host. All builds of a
//! run share one container identity, so the first in-container failure
//! aborts the remaining Debian work for the run while other packagers carry
//! on. The whole-run policy difference is deliberate; see DESIGN.md.

mod container;
mod template;

pub use container::remove_container;

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use handlebars::Handlebars;

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::package::plain::copy_executable;
use crate::package::platform::BuildArtifact;
use crate::version::VersionInfo;
use container::DebImage;

/// Builds Debian packages for all Linux binaries.
///
/// Returns the finished package paths paired with the binaries they came
/// from. A failed image build is fatal; a failed in-container run ends
/// Debian packaging early with whatever was already built.
pub async fn package_all<'a>(
    config: &ReleaseConfig,
    version: &VersionInfo,
    builds: &[&'a BuildArtifact],
) -> Result<Vec<(&'a BuildArtifact, PathBuf)>> {
    if !config.debian.enabled {
        log::info!("Debian packaging disabled");
        return Ok(Vec::new());
    }
    if builds.is_empty() {
        return Ok(Vec::new());
    }

    // A previous interrupted run may have left the container behind.
    remove_container(&config.debian.container).await;

    let image = DebImage::build(&config.debian).await?;

    let mut packaged = Vec::new();
    for build in builds {
        match package_one(config, version, &image, build).await {
            Ok(path) => packaged.push((*build, path)),
            Err(e) => {
                log::error!(
                    "Debian packaging for {} failed: {e}; skipping remaining Debian builds, \
                     the shared container state can no longer be trusted",
                    build.target.tag()
                );
                break;
            }
        }
    }

    Ok(packaged)
}

async fn package_one(
    config: &ReleaseConfig,
    version: &VersionInfo,
    image: &DebImage,
    build: &BuildArtifact,
) -> Result<PathBuf> {
    let scratch = tempfile::tempdir()?;
    stage_tree(config, version, build, scratch.path()).await?;

    let name = format!(
        "{}-{}-{}.deb",
        config.product,
        version.version,
        build.target.tag()
    );
    image
        .run_packaging(&config.debian, scratch.path(), &name)
        .await?;

    let built = scratch.path().join(&name);
    let dest = config.output_dir.join(&name);
    tokio::fs::create_dir_all(&config.output_dir).await?;
    tokio::fs::copy(&built, &dest).await?;

    log::info!("created {}", dest.display());
    Ok(dest)
}

/// Lays out the package filesystem under `<scratch>/pkg`.
async fn stage_tree(
    config: &ReleaseConfig,
    version: &VersionInfo,
    build: &BuildArtifact,
    scratch: &Path,
) -> Result<()> {
    let pkg = scratch.join("pkg");
    let prefix = pkg.join(config.debian.prefix.trim_start_matches('/'));
    let doc_dir = pkg.join("usr/share/doc").join(&config.product);
    let bin_dir = pkg.join("usr/local/bin");
    for dir in [&prefix, &doc_dir, &bin_dir, &pkg.join("DEBIAN")] {
        tokio::fs::create_dir_all(dir).await?;
    }

    copy_executable(&build.path, &prefix.join(&config.binary)).await?;

    let wrapper_name = format!("{}.sh", config.binary);
    let wrapper = render(
        template::WRAPPER_TEMPLATE,
        &data(config, version, None),
    )?;
    tokio::fs::write(prefix.join(&wrapper_name), wrapper).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(
            prefix.join(&wrapper_name),
            std::fs::Permissions::from_mode(0o755),
        )
        .await?;
    }

    #[cfg(unix)]
    tokio::fs::symlink(
        format!("{}/{}", config.debian.prefix, wrapper_name),
        bin_dir.join(&config.binary),
    )
    .await?;

    let control = render(
        template::CONTROL_TEMPLATE,
        &data(config, version, Some(deb_arch(&build.target.arch))),
    )?;
    tokio::fs::write(pkg.join("DEBIAN/control"), control).await?;

    let copyright = render(
        template::COPYRIGHT_TEMPLATE,
        &data(config, version, None),
    )?;
    tokio::fs::write(doc_dir.join("copyright"), copyright).await?;

    let changelog = render(
        template::CHANGELOG_TEMPLATE,
        &data(config, version, None),
    )?;
    let mut encoder = GzEncoder::new(
        std::fs::File::create(doc_dir.join("changelog.Debian.gz"))?,
        Compression::default(),
    );
    encoder.write_all(changelog.as_bytes())?;
    encoder.finish()?;

    Ok(())
}

fn data(
    config: &ReleaseConfig,
    version: &VersionInfo,
    arch: Option<&str>,
) -> BTreeMap<&'static str, String> {
    let mut data = BTreeMap::new();
    data.insert("package", config.product.clone());
    data.insert("binary", config.binary.clone());
    data.insert("version", version.version.clone());
    data.insert("build", version.build.to_string());
    data.insert("commit", version.commit.clone());
    data.insert("maintainer", config.debian.maintainer.clone());
    data.insert("description", config.debian.description.clone());
    if let Some(arch) = arch {
        data.insert("arch", arch.to_string());
    }
    data
}

fn render(template: &str, data: &BTreeMap<&'static str, String>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("t", template)
        .map_err(|e| anyhow::anyhow!("registering template: {e}"))?;
    handlebars
        .render("t", data)
        .map_err(|e| anyhow::anyhow!("rendering template: {e}"))
        .map_err(Into::into)
}

/// Maps a backend architecture name to the dpkg one.
fn deb_arch(arch: &str) -> &str {
    match arch {
        "amd64" => "amd64",
        "386" => "i386",
        "arm64" => "arm64",
        other => other,
    }
}
