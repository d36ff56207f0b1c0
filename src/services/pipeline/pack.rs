//! Repackaging validated records into per-mod output archives.
//!
//! One bounded unit of work per record. Incomplete records are never packed
//! but still flow into the store, so a later run (or a user edit of the
//! snapshot) can finish the job without rediscovery. When every unit is done
//! the store is updated with replace semantics and persisted once.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::services::archive;
use crate::services::remote::{CatalogClient, REMOTE_TIMEOUT};
use crate::services::store::ModStore;
use crate::types::{CoreResult, ModRecord};

use super::extract::DEFAULT_CONCURRENCY;
use super::manifest::ManifestBuilder;

pub struct Packer {
    output_dir: PathBuf,
    concurrency: usize,
    manifest: Arc<ManifestBuilder>,
}

impl Packer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            manifest: Arc::new(ManifestBuilder::new()),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The manifest document for everything packed so far.
    pub fn manifest_html(&self) -> String {
        self.manifest.to_html()
    }

    /// Pack every packable record, then replace-and-save the store snapshot.
    ///
    /// Returns the records as they now stand (packed ones flagged
    /// `published`). Per-record failures are logged and leave that record
    /// unpublished; they never abort sibling units or the store save.
    pub async fn pack_all(
        &self,
        records: Vec<ModRecord>,
        store: Arc<Mutex<ModStore>>,
        remote: Arc<dyn CatalogClient>,
    ) -> CoreResult<Vec<ModRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut units: JoinSet<ModRecord> = JoinSet::new();

        for record in records {
            let semaphore = semaphore.clone();
            let manifest = self.manifest.clone();
            let remote = remote.clone();
            let output_dir = self.output_dir.clone();

            units.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return record;
                };
                pack_record(record, output_dir, manifest, remote).await
            });
        }

        let mut packed = Vec::new();
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(record) => packed.push(record),
                Err(e) => log::warn!("Packing unit panicked: {e}"),
            }
        }

        {
            let mut store = store.lock().unwrap();
            for record in &packed {
                store.replace(record.clone());
            }
            store.save()?;
        }
        Ok(packed)
    }
}

/// One unit of work: build the output archive, add the manifest row, flag the
/// record published, and submit user-entered records to the catalog.
async fn pack_record(
    mut record: ModRecord,
    output_dir: PathBuf,
    manifest: Arc<ManifestBuilder>,
    remote: Arc<dyn CatalogClient>,
) -> ModRecord {
    if record.published {
        log::debug!("Already published, not repacking: {}", record.id);
        return record;
    }
    if !record.is_complete() {
        log::info!(
            "Record for {} is incomplete, keeping it unpacked",
            record
                .source_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| record.id.clone())
        );
        return record;
    }
    let Some(source) = record.source_path.clone() else {
        log::warn!("Record '{}' has no source path, cannot pack", record.id);
        return record;
    };

    let slug = record.normalized_id();
    let version = record.packaged_version();
    let archive_path = output_dir
        .join("mods")
        .join(&slug)
        .join(format!("{slug}-{version}.zip"));

    log::debug!("Packing {slug}");
    let pack_result = {
        let source = source.clone();
        let archive_path = archive_path.clone();
        tokio::task::spawn_blocking(move || {
            archive::pack_single_file(&source, &archive_path, "mods/")
        })
        .await
    };
    match pack_result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            log::warn!("Failed to pack {slug}: {e}");
            return record;
        }
        Err(e) => {
            log::warn!("Packing task failed for {slug}: {e}");
            return record;
        }
    }

    manifest.add_row(&record.name, &slug, &version);
    record.published = true;

    // Only data a user actually entered goes back to the catalog; records
    // built from a prior suggestion would just echo the catalog at itself.
    if record.from_user_input && !record.from_suggestion {
        submit_to_catalog(&record, &version, remote).await;
    }

    record
}

/// Catalog submission is best effort: failures are logged, never fatal.
async fn submit_to_catalog(record: &ModRecord, version: &str, remote: Arc<dyn CatalogClient>) {
    let mod_id = match timeout(REMOTE_TIMEOUT, remote.publish_record(record)).await {
        Ok(Ok(id)) => id,
        Ok(Err(e)) => {
            log::warn!("Could not publish '{}' to the catalog: {e}", record.id);
            return;
        }
        Err(_) => {
            log::warn!("Publishing '{}' to the catalog timed out", record.id);
            return;
        }
    };

    match timeout(
        REMOTE_TIMEOUT,
        remote.submit_version(&mod_id, &record.content_hash, version),
    )
    .await
    {
        Ok(Ok(())) => log::debug!("Submitted {} {version} to the catalog", record.id),
        Ok(Err(e)) => log::warn!("Could not submit version for '{}': {e}", record.id),
        Err(_) => log::warn!("Version submission for '{}' timed out", record.id),
    }
}

#[cfg(test)]
#[path = "tests/pack_tests.rs"]
mod tests;
