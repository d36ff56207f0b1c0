use super::*;
use crate::services::pipeline::ChannelObserver;
use crate::services::remote::NullCatalog;
use crate::services::{hashing, store::ModStore};
use crate::test_utils::{schema_a_descriptor, write_zip};
use crate::types::CoreResult;
use async_trait::async_trait;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    store: Arc<Mutex<ModStore>>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = ModStore::load(dir.path().join("mods_db.json")).unwrap();
        Self {
            dir,
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn archive(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.dir.path().join(name);
        write_zip(&path, entries);
        path
    }
}

/// Catalog that answers every enrichment with a fixed suggestion.
struct SuggestingCatalog {
    suggestion: ModRecord,
}

#[async_trait]
impl CatalogClient for SuggestingCatalog {
    async fn lookup_by_hash(&self, _content_hash: &str) -> CoreResult<Option<ModRecord>> {
        Ok(None)
    }

    async fn fetch_missing_fields(&self, partial: &ModRecord) -> CoreResult<ModRecord> {
        let mut merged = partial.clone();
        merged.merge_missing(&self.suggestion);
        Ok(merged)
    }

    async fn publish_record(&self, record: &ModRecord) -> CoreResult<String> {
        Ok(record.id.clone())
    }

    async fn submit_version(
        &self,
        _mod_id: &str,
        _content_hash: &str,
        _version: &str,
    ) -> CoreResult<()> {
        Ok(())
    }
}

#[test]
fn classification_triages_by_filename() {
    assert_eq!(classify("forge-1.7.10-installer.jar"), FileClass::Ignored);
    assert_eq!(classify("liteloader-1.7.10.jar"), FileClass::Ignored);
    assert_eq!(classify("voxelmap.litemod"), FileClass::Special);
    assert_eq!(classify("ironchests.jar.disabled"), FileClass::Special);
    assert_eq!(classify("ironchests.jar"), FileClass::Normal);
}

#[tokio::test]
async fn valid_descriptor_produces_a_complete_record() {
    let fx = Fixture::new();
    let file = fx.archive(
        "ironchests.jar.zip",
        &[("mcmod.info", schema_a_descriptor("ironchests").as_bytes())],
    );

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![file.clone()],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.is_complete());
    assert_eq!(record.id, "ironchests");
    assert_eq!(record.source_path.as_deref(), Some(file.as_path()));
    assert!(!record.content_hash.is_empty());
}

#[tokio::test]
async fn unparseable_descriptor_degrades_to_blank_record_and_notifies() {
    let fx = Fixture::new();
    let file = fx.archive("mystery.zip", &[("mcmod.info", b"not json".as_slice())]);

    let (observer, mut events) = ChannelObserver::new();
    let pipeline = ExtractionPipeline::new("1.7.10").with_observer(Arc::new(observer));
    let records = pipeline
        .extract_all(
            vec![file.clone()],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(!record.is_complete());
    // local inference still derived what it could
    assert_eq!(record.id, "mystery");
    assert_eq!(record.game_version, "1.7.10");
    assert!(record.name.is_empty());

    let mut saw_parse_failure = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, PipelineEvent::DescriptorParseFailed(ref p) if p == &file) {
            saw_parse_failure = true;
        }
    }
    assert!(saw_parse_failure);
}

#[tokio::test]
async fn published_store_hit_short_circuits() {
    let fx = Fixture::new();
    let file = fx.archive(
        "ironchests.jar.zip",
        &[("mcmod.info", schema_a_descriptor("ironchests").as_bytes())],
    );
    let hash = hashing::hash_file(&file).unwrap();
    fx.store.lock().unwrap().replace(ModRecord {
        content_hash: hash,
        published: true,
        ..ModRecord::default()
    });

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![file],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn unpublished_store_hit_resumes_the_stored_record() {
    let fx = Fixture::new();
    // Archive has a descriptor, but the stored record must win over re-parsing.
    let file = fx.archive(
        "ironchests.jar.zip",
        &[("mcmod.info", schema_a_descriptor("ironchests").as_bytes())],
    );
    let hash = hashing::hash_file(&file).unwrap();
    fx.store.lock().unwrap().replace(ModRecord {
        id: "ironchests".to_string(),
        name: "Stored Name".to_string(),
        version: "9.9".to_string(),
        game_version: "1.7.10".to_string(),
        content_hash: hash.clone(),
        ..ModRecord::default()
    });

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![file],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Stored Name");
    assert_eq!(records[0].content_hash, hash);
}

#[tokio::test]
async fn identical_files_collapse_to_one_record() {
    let fx = Fixture::new();
    let descriptor = schema_a_descriptor("modx");
    let a = fx.archive("modx.jar.zip", &[("mcmod.info", descriptor.as_bytes())]);
    let b = fx.archive("copy-of-modx.zip", &[("mcmod.info", descriptor.as_bytes())]);

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![a, b],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn loader_binaries_produce_no_record() {
    let fx = Fixture::new();
    let file = fx.archive("forge-1.7.10-installer.zip", &[("code.class", b"x".as_slice())]);

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![file],
            fx.store.clone(),
            Arc::new(NullCatalog),
            CancelToken::new(),
        )
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn cancelled_token_aborts_queued_units() {
    let fx = Fixture::new();
    let file = fx.archive(
        "ironchests.jar.zip",
        &[("mcmod.info", schema_a_descriptor("ironchests").as_bytes())],
    );

    let cancel = CancelToken::new();
    cancel.cancel();

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(vec![file], fx.store.clone(), Arc::new(NullCatalog), cancel)
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn remote_enrichment_fills_gaps_and_flags_the_suggestion() {
    let fx = Fixture::new();
    let file = fx.archive("mystery.zip", &[("data.bin", b"payload".as_slice())]);

    let catalog = SuggestingCatalog {
        suggestion: ModRecord {
            name: "Remote Name".to_string(),
            version: "3.1".to_string(),
            ..ModRecord::default()
        },
    };

    let pipeline = ExtractionPipeline::new("1.7.10");
    let records = pipeline
        .extract_all(
            vec![file],
            fx.store.clone(),
            Arc::new(catalog),
            CancelToken::new(),
        )
        .await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "Remote Name");
    assert_eq!(record.version, "3.1");
    assert!(record.from_suggestion);
    assert!(record.is_complete());
}
