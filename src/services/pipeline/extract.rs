//! Per-file extraction units: hash, dedup against the store, descriptor
//! parsing, local inference and remote enrichment.
//!
//! One unit of work runs per discovered file, capped by a semaphore so a
//! ten-thousand-file tree does not fan out into ten thousand tasks. Blocking
//! archive and hash I/O is pushed onto `spawn_blocking`. Every failure is
//! isolated to its unit; the pipeline always returns best-effort results.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::services::remote::{CatalogClient, REMOTE_TIMEOUT};
use crate::services::store::ModStore;
use crate::services::{archive, descriptor, hashing};
use crate::types::record::infer_slug;
use crate::types::ModRecord;

use super::events::{CancelToken, NullObserver, PipelineEvent, PipelineObserver};

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Filename-based triage before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Loader binaries that look like mods but are not; produce no record.
    Ignored,
    Normal,
    /// Liteloader mods and disabled mods; slug inference strips the
    /// `.disabled` wrapper before looking at the name.
    Special,
}

pub fn classify(file_name: &str) -> FileClass {
    let lower = file_name.to_ascii_lowercase();
    if lower.starts_with("forge-")
        || lower.starts_with("minecraftforge")
        || lower.contains("liteloader")
    {
        FileClass::Ignored
    } else if lower.ends_with(".litemod") || lower.ends_with(".disabled") {
        FileClass::Special
    } else {
        FileClass::Normal
    }
}

pub struct ExtractionPipeline {
    game_version: String,
    concurrency: usize,
    observer: Arc<dyn PipelineObserver>,
}

impl ExtractionPipeline {
    pub fn new(game_version: impl Into<String>) -> Self {
        Self {
            game_version: game_version.into(),
            concurrency: DEFAULT_CONCURRENCY,
            observer: Arc::new(NullObserver),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run one unit of work per file and return the produced records.
    ///
    /// Records for files whose hash is already published in the store are
    /// skipped; duplicate hashes within the run collapse to the first record
    /// produced. Returns when every unit has finished; cancellation stops
    /// units that have not started and keeps everything already produced.
    pub async fn extract_all(
        &self,
        files: Vec<PathBuf>,
        store: Arc<Mutex<ModStore>>,
        remote: Arc<dyn CatalogClient>,
        cancel: CancelToken,
    ) -> Vec<ModRecord> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut units: JoinSet<Option<ModRecord>> = JoinSet::new();

        for file in files {
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let observer = self.observer.clone();
            let store = store.clone();
            let remote = remote.clone();
            let game_version = self.game_version.clone();

            units.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                if cancel.is_cancelled() {
                    log::debug!("Cancelled before start: {}", file.display());
                    return None;
                }
                process_file(file, game_version, observer, store, remote).await
            });
        }

        let mut records = Vec::new();
        let mut seen_hashes: HashSet<String> = HashSet::new();
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(Some(record)) => {
                    if seen_hashes.insert(record.content_hash.clone()) {
                        records.push(record);
                    } else {
                        log::debug!(
                            "Duplicate content hash {}, collapsing to one record",
                            record.content_hash
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => log::warn!("Extraction unit panicked: {e}"),
            }
        }
        records
    }
}

/// One unit of work. Any error degrades this file only.
async fn process_file(
    file: PathBuf,
    game_version: String,
    observer: Arc<dyn PipelineObserver>,
    store: Arc<Mutex<ModStore>>,
    remote: Arc<dyn CatalogClient>,
) -> Option<ModRecord> {
    observer.notify(PipelineEvent::FileStarted(file.clone()));

    let file_name = file.file_name()?.to_string_lossy().to_string();
    if classify(&file_name) == FileClass::Ignored {
        log::debug!("Ignoring loader binary: {file_name}");
        return None;
    }

    let content_hash = {
        let path = file.clone();
        match tokio::task::spawn_blocking(move || hashing::hash_file(&path)).await {
            Ok(Ok(digest)) => digest,
            Ok(Err(e)) => {
                log::warn!("Could not hash {}: {e}", file.display());
                return None;
            }
            Err(e) => {
                log::warn!("Hashing task failed for {}: {e}", file.display());
                return None;
            }
        }
    };

    let known = store.lock().unwrap().find(&content_hash).cloned();
    let mut record = match known {
        Some(existing) if existing.published => {
            log::debug!("Already published, skipping: {file_name}");
            return None;
        }
        // Known but unpublished: resume from the stored record instead of
        // re-parsing the archive.
        Some(existing) => existing,
        None => read_and_parse_descriptor(&file, &observer).await,
    };

    record.source_path = Some(file.clone());
    record.content_hash = content_hash;

    if !record.is_complete() {
        infer_locally(&mut record, &file, &file_name, &game_version).await;
    }
    if !record.is_complete() {
        enrich_remotely(&mut record, &file, &observer, remote).await;
    }

    Some(record)
}

/// Descriptor text -> parsed record, degrading to a blank record when there
/// is no descriptor or it matches no schema.
async fn read_and_parse_descriptor(
    file: &Path,
    observer: &Arc<dyn PipelineObserver>,
) -> ModRecord {
    let text = {
        let path = file.to_path_buf();
        match tokio::task::spawn_blocking(move || archive::read_descriptor_text(&path)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                log::warn!("Could not read descriptor from {}: {e}", file.display());
                None
            }
            Err(e) => {
                log::warn!("Descriptor task failed for {}: {e}", file.display());
                None
            }
        }
    };

    let Some(text) = text else {
        return ModRecord::default();
    };
    match descriptor::parse_descriptor(&text) {
        Ok(record) => record,
        Err(e) => {
            log::info!("Descriptor in {} unusable: {e}", file.display());
            observer.notify(PipelineEvent::DescriptorParseFailed(file.to_path_buf()));
            ModRecord::default()
        }
    }
}

/// Cheap local inference before asking the catalog.
async fn infer_locally(record: &mut ModRecord, file: &Path, file_name: &str, game_version: &str) {
    if record.id.is_empty() {
        record.id = infer_slug(file_name);
    }
    if record.authors.is_empty() {
        let path = file.to_path_buf();
        if let Ok(Ok(authors)) =
            tokio::task::spawn_blocking(move || archive::read_archive_authors(&path)).await
        {
            record.authors = authors;
        }
    }
    if record.game_version.is_empty() {
        record.game_version = game_version.to_string();
    }
}

/// Remote enrichment, by hash first, then field completion.
/// Failure leaves the record incomplete; merged fields mark the record as
/// suggestion-sourced so it is never submitted back to the catalog.
async fn enrich_remotely(
    record: &mut ModRecord,
    file: &Path,
    observer: &Arc<dyn PipelineObserver>,
    remote: Arc<dyn CatalogClient>,
) {
    let mut merged = false;

    match timeout(REMOTE_TIMEOUT, remote.lookup_by_hash(&record.content_hash)).await {
        Ok(Ok(Some(known))) => merged |= record.merge_missing(&known),
        Ok(Ok(None)) => {}
        Ok(Err(e)) => {
            log::warn!("Catalog lookup failed for {}: {e}", file.display());
            observer.notify(PipelineEvent::RemoteLookupFailed(file.to_path_buf()));
            return;
        }
        Err(_) => {
            log::warn!("Catalog lookup timed out for {}", file.display());
            observer.notify(PipelineEvent::RemoteLookupFailed(file.to_path_buf()));
            return;
        }
    }

    if !record.is_complete() {
        match timeout(REMOTE_TIMEOUT, remote.fetch_missing_fields(record)).await {
            Ok(Ok(suggestion)) => merged |= record.merge_missing(&suggestion),
            Ok(Err(e)) => {
                log::warn!("Catalog suggestion failed for {}: {e}", file.display());
                observer.notify(PipelineEvent::RemoteLookupFailed(file.to_path_buf()));
            }
            Err(_) => {
                log::warn!("Catalog suggestion timed out for {}", file.display());
                observer.notify(PipelineEvent::RemoteLookupFailed(file.to_path_buf()));
            }
        }
    }

    if merged {
        record.from_suggestion = true;
    }
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
