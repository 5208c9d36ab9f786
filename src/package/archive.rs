//! Archive creation and extraction helpers.
//!
//! Tar and zip archives are written in-process. Tar entries are added in
//! sorted path order with fixed timestamps and ownership, so repeated runs
//! over unchanged staging trees produce byte-identical archives.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

use crate::bail;
use crate::error::Result;

/// Collects all regular files and symlinks under `dir` in sorted order.
fn sorted_files(dir: &Path) -> Vec<walkdir::DirEntry> {
    let mut entries: Vec<_> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || e.file_type().is_symlink())
        .collect();
    entries.sort_by_key(|e| e.path().to_path_buf());
    entries
}

/// Packs the contents of `src_dir` into a gzip-compressed tar at `dest`,
/// with entry names relative to `src_dir`. Overwrites an existing archive.
pub fn tar_gz_dir(src_dir: &Path, dest: &Path) -> Result<()> {
    let encoder = GzEncoder::new(File::create(dest)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in sorted_files(src_dir) {
        let Ok(rel) = entry.path().strip_prefix(src_dir) else {
            continue;
        };

        // Staging copies get fresh timestamps on every run; pinning the
        // header fields keeps repeat archives byte-identical.
        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        if entry.file_type().is_symlink() {
            let target = std::fs::read_link(entry.path())?;
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_mode(0o777);
            builder.append_link(&mut header, rel, &target)?;
        } else {
            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            header.set_size(metadata.len());
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                header.set_mode(metadata.permissions().mode() & 0o7777);
            }
            #[cfg(not(unix))]
            header.set_mode(0o644);
            builder.append_data(&mut header, rel, File::open(entry.path())?)?;
        }
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

/// Packs the contents of `src_dir` into a zip at `dest`, with entry names
/// relative to `src_dir`. Overwrites an existing archive.
pub fn zip_dir(src_dir: &Path, dest: &Path) -> Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(dest)?);

    for entry in sorted_files(src_dir) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        let name = rel.to_string_lossy().replace('\\', "/");

        let mut options = zip::write::SimpleFileOptions::default();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            options = options.unix_permissions(metadata.permissions().mode());
        }

        writer.start_file(name, options)?;
        let mut file = File::open(entry.path())?;
        io::copy(&mut file, &mut writer)?;
    }

    writer.finish()?.flush()?;
    Ok(())
}

/// Unpacks a gzip-compressed tar archive into `dest_dir`.
pub fn extract_tar_gz(archive: &Path, dest_dir: &Path) -> Result<()> {
    if !archive.is_file() {
        bail!("archive does not exist: {}", archive.display());
    }
    let decoder = GzDecoder::new(File::open(archive)?);
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.unpack(dest_dir)?;
    Ok(())
}
