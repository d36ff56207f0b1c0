//! Whole-pipeline run over a scratch directory tree: discovery, extraction,
//! repackaging and the store snapshot, with no catalog attached.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use modpacker::services::finder;
use modpacker::services::pipeline::{CancelToken, ExtractionPipeline, Packer};
use modpacker::services::remote::NullCatalog;
use modpacker::services::store::ModStore;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

const MODX_DESCRIPTOR: &str = r#"[{
    "modid": "modx",
    "name": "Mod X",
    "version": "1.2",
    "mcversion": "1.7.10",
    "authorList": ["alice"]
}]"#;

struct World {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
    store_path: PathBuf,
}

impl World {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir_all(&input).unwrap();

        // A: parseable descriptor. B: descriptor that matches no schema.
        // C: byte-identical to A under another name.
        write_zip(
            &input.join("modx-1.2.zip"),
            &[("mcmod.info", MODX_DESCRIPTOR.as_bytes())],
        );
        write_zip(
            &input.join("mystery.zip"),
            &[("mystery.info", b"not a descriptor".as_slice())],
        );
        write_zip(
            &input.join("copy-of-modx.zip"),
            &[("mcmod.info", MODX_DESCRIPTOR.as_bytes())],
        );

        Self {
            input,
            output: dir.path().join("output"),
            store_path: dir.path().join("mods_db.json"),
            _dir: dir,
        }
    }

    async fn run(&self) -> Arc<Mutex<ModStore>> {
        let store = Arc::new(Mutex::new(ModStore::load(&self.store_path).unwrap()));
        let remote = Arc::new(NullCatalog);

        let files = finder::find_mod_files(&self.input).unwrap();
        let pipeline = ExtractionPipeline::new("1.7.10");
        let records = pipeline
            .extract_all(files, store.clone(), remote.clone(), CancelToken::new())
            .await;

        let packer = Packer::new(&self.output);
        packer
            .pack_all(records, store.clone(), remote)
            .await
            .unwrap();

        std::fs::create_dir_all(&self.output).unwrap();
        std::fs::write(self.output.join("modlist.html"), packer.manifest_html()).unwrap();
        store
    }
}

#[tokio::test]
async fn duplicate_archives_collapse_and_everything_lands_in_the_store() {
    let world = World::new();
    let store = world.run().await;

    // Two distinct content hashes: modx (A and C collapse) plus the mystery
    // file, which stays incomplete but is still persisted.
    assert_eq!(store.lock().unwrap().len(), 2);

    let modx_dir = world.output.join("mods").join("modx");
    let packed: Vec<_> = std::fs::read_dir(&modx_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(packed, vec!["modx-1.7.10-1.2.zip".to_string()]);

    let html = std::fs::read_to_string(world.output.join("modlist.html")).unwrap();
    assert_eq!(html.matches("<tr><td>").count(), 1);
    assert!(html.contains("Mod X"));
}

#[tokio::test]
async fn second_run_is_a_no_op_for_the_store() {
    let world = World::new();
    let first = world.run().await;
    let snapshot_after_first = std::fs::read_to_string(&world.store_path).unwrap();

    let second = world.run().await;
    let snapshot_after_second = std::fs::read_to_string(&world.store_path).unwrap();

    assert_eq!(
        first.lock().unwrap().len(),
        second.lock().unwrap().len()
    );
    assert_eq!(snapshot_after_first, snapshot_after_second);
}
