//! Zip archive utilities: descriptor extraction and output packing.

pub mod read;
pub mod write;

pub use read::{extract_descriptor_files, read_archive_authors, read_descriptor_text};
pub use write::{create_archive, pack_single_file};

/// Descriptor entries end in `.info` or are named exactly `litemod.json`.
/// Entries listing dependencies carry requirements, not metadata, and are
/// skipped (the misspelling occurs in the wild).
pub(crate) fn is_descriptor_entry(entry_name: &str) -> bool {
    let file_name = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let lower = file_name.to_ascii_lowercase();
    if lower.contains("dependencies") || lower.contains("dependancies") {
        return false;
    }
    lower.ends_with(".info") || file_name == "litemod.json"
}
