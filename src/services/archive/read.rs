//! Reading descriptor metadata out of mod archives.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::types::{CoreError, CoreResult};

use super::is_descriptor_entry;

/// Read the text of the first descriptor entry in the archive, straight from
/// the entry stream. Returns `None` when no entry matches.
pub fn read_descriptor_text(archive_path: &Path) -> CoreResult<Option<String>> {
    let mut archive = open_archive(archive_path)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !is_descriptor_entry(entry.name()) {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
    }
    Ok(None)
}

/// Write every descriptor entry in the archive into `dest_dir`, creating the
/// directory if absent. Returns the written files.
pub fn extract_descriptor_files(archive_path: &Path, dest_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut archive = open_archive(archive_path)?;
    if !dest_dir.exists() {
        fs::create_dir_all(dest_dir)?;
    }

    let mut written = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !is_descriptor_entry(entry.name()) {
            continue;
        }
        let file_name = match entry.name().rsplit('/').next() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => continue,
        };
        let out_path = dest_dir.join(file_name);
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        written.push(out_path);
    }
    Ok(written)
}

/// Attribute keys in `META-INF/MANIFEST.MF` that name the people or vendor
/// behind a jar.
const AUTHOR_ATTRIBUTES: &[&str] = &["Implementation-Vendor", "Specification-Vendor", "Built-By"];

/// Pull author-ish names from the archive's jar manifest, deduplicated, in
/// manifest order. Best effort: a missing manifest yields an empty list.
pub fn read_archive_authors(archive_path: &Path) -> CoreResult<Vec<String>> {
    let mut archive = open_archive(archive_path)?;

    let mut text = String::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().ends_with("META-INF/MANIFEST.MF") {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            text = String::from_utf8_lossy(&bytes).into_owned();
            break;
        }
    }

    let mut authors = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !AUTHOR_ATTRIBUTES.contains(&key.trim()) {
            continue;
        }
        let value = value.trim();
        if !value.is_empty() && !authors.iter().any(|a| a == value) {
            authors.push(value.to_string());
        }
    }
    Ok(authors)
}

fn open_archive(archive_path: &Path) -> CoreResult<ZipArchive<File>> {
    if !archive_path.exists() {
        return Err(CoreError::ArchiveNotFound(archive_path.to_path_buf()));
    }
    let file = File::open(archive_path)?;
    Ok(ZipArchive::new(file)?)
}

#[cfg(test)]
#[path = "tests/read_tests.rs"]
mod tests;
