//! Shared fixtures for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a zip archive at `path` from (entry name, contents) pairs.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        zip.start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// A schema-A descriptor with every field required for completeness.
pub fn schema_a_descriptor(modid: &str) -> String {
    format!(
        r#"[{{"modid":"{modid}","name":"Mod {modid}","version":"1.0","mcversion":"1.7.10","authorList":["alice"]}}]"#
    )
}

/// List the entry names of a zip archive.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
