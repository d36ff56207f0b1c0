//! Directory walker that collects candidate mod archives.
//! Uses `walkdir` for recursive traversal; no depth limit.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::types::{CoreError, CoreResult};

/// Archive extensions that may contain a mod.
const MOD_EXTENSIONS: &[&str] = &["zip", "jar", "litemod", "disabled"];

/// Split-archive coordinate names like `-12,-34.zip` are map region exports,
/// not mods.
fn split_archive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?[0-9]+,-?[0-9]+\.zip$").unwrap())
}

/// Walk `root` and return every file with a recognized mod extension.
///
/// Zip files whose name matches the split-archive pattern are skipped.
/// Enumeration order is filesystem-defined and not guaranteed stable.
pub fn find_mod_files(root: &Path) -> CoreResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CoreError::InvalidArgument(format!(
            "Input is not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let extension = match entry.path().extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => continue,
        };
        if !MOD_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if extension == "zip" && split_archive_pattern().is_match(&name) {
            log::debug!("Skipping split archive: {name}");
            continue;
        }

        files.push(entry.into_path());
    }
    Ok(files)
}
