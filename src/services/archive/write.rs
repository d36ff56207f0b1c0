//! Building output archives.

use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::types::{CoreError, CoreResult};

/// Zip every file under `source_dir` into `output_archive`, skipping files
/// whose name matches a blacklist pattern. Entry names are relative to
/// `source_dir`, with `/` separators.
///
/// Blacklist patterns support three modes: `*suffix` (suffix match),
/// `prefix*` (prefix match) and a bare name (exact match).
pub fn create_archive(
    source_dir: &Path,
    output_archive: &Path,
    blacklist: &[String],
) -> CoreResult<()> {
    require_zip_extension(output_archive)?;

    let mut zip = new_writer(output_archive)?;
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(source_dir).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matches_blacklist(&name, blacklist) {
            log::debug!("Blacklisted, not packing: {name}");
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| CoreError::InvalidArgument(e.to_string()))?;
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(entry_name, options)?;
        let mut reader = File::open(entry.path())?;
        io::copy(&mut reader, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Write exactly one entry, `entry_prefix + file_name`, holding the full
/// contents of `file`.
pub fn pack_single_file(file: &Path, output_archive: &Path, entry_prefix: &str) -> CoreResult<()> {
    require_zip_extension(output_archive)?;
    if !file.exists() {
        return Err(CoreError::ArchiveNotFound(file.to_path_buf()));
    }

    let file_name = file
        .file_name()
        .ok_or_else(|| CoreError::InvalidArgument(format!("No file name: {}", file.display())))?
        .to_string_lossy();

    let mut zip = new_writer(output_archive)?;
    zip.start_file(format!("{entry_prefix}{file_name}"), SimpleFileOptions::default())?;
    let mut reader = File::open(file)?;
    io::copy(&mut reader, &mut zip)?;
    zip.finish()?;
    Ok(())
}

/// Check one file name against every blacklist pattern.
pub(crate) fn matches_blacklist(name: &str, blacklist: &[String]) -> bool {
    blacklist.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else {
            name == pattern
        }
    })
}

fn require_zip_extension(path: &Path) -> CoreResult<()> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(CoreError::InvalidArgument(format!(
            "Output archive must be a .zip file: {}",
            path.display()
        )));
    }
    Ok(())
}

fn new_writer(output_archive: &Path) -> CoreResult<ZipWriter<File>> {
    if let Some(parent) = output_archive.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(ZipWriter::new(File::create(output_archive)?))
}

#[cfg(test)]
#[path = "tests/write_tests.rs"]
mod tests;
