//! Remote catalog collaborator.
//!
//! The pipeline only needs the operations on this trait; every call may fail
//! independently without aborting the run. Failures map to
//! `CoreError::RemoteUnavailable` and degrade the record to local-only data.

pub mod solder;

use async_trait::async_trait;

use crate::types::{CoreResult, ModRecord};

pub use solder::SolderClient;

/// Deadline applied to every remote call.
pub const REMOTE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up a known record by content hash.
    async fn lookup_by_hash(&self, content_hash: &str) -> CoreResult<Option<ModRecord>>;

    /// Ask the catalog to fill in whatever fields it knows for a partial
    /// record. Returns the enriched record; unknown fields come back as sent.
    async fn fetch_missing_fields(&self, partial: &ModRecord) -> CoreResult<ModRecord>;

    /// Publish a new record to the catalog. Returns the catalog-side id.
    async fn publish_record(&self, record: &ModRecord) -> CoreResult<String>;

    /// Register one packed version of a published mod.
    async fn submit_version(&self, mod_id: &str, content_hash: &str, version: &str)
        -> CoreResult<()>;
}

/// Offline stand-in: every lookup misses and enrichment returns the input
/// unchanged, so records simply stay incomplete.
pub struct NullCatalog;

#[async_trait]
impl CatalogClient for NullCatalog {
    async fn lookup_by_hash(&self, _content_hash: &str) -> CoreResult<Option<ModRecord>> {
        Ok(None)
    }

    async fn fetch_missing_fields(&self, partial: &ModRecord) -> CoreResult<ModRecord> {
        Ok(partial.clone())
    }

    async fn publish_record(&self, record: &ModRecord) -> CoreResult<String> {
        log::debug!("No catalog configured, not publishing '{}'", record.id);
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
