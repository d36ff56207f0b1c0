//! HTTP client for a Solder-style mod catalog.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::types::{CoreError, CoreResult, ModRecord};

use super::{CatalogClient, REMOTE_TIMEOUT};

pub struct SolderClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct VersionSubmission<'a> {
    hash: &'a str,
    version: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    id: String,
}

impl SolderClient {
    /// Connect to a catalog at `base_url`. Probes the service once so a dead
    /// endpoint is reported up front instead of on the first lookup.
    pub async fn connect(base_url: &str) -> CoreResult<Self> {
        let client = reqwest::Client::builder().timeout(REMOTE_TIMEOUT).build()?;
        let handle = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        };

        let probe = handle.url("api/ping");
        handle.client.get(&probe).send().await?.error_for_status()?;
        log::info!("Connected to mod catalog at {}", handle.base_url);
        Ok(handle)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl CatalogClient for SolderClient {
    async fn lookup_by_hash(&self, content_hash: &str) -> CoreResult<Option<ModRecord>> {
        let response = self
            .client
            .get(self.url(&format!("api/mods/{content_hash}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record = response.error_for_status()?.json::<ModRecord>().await?;
        Ok(Some(record))
    }

    async fn fetch_missing_fields(&self, partial: &ModRecord) -> CoreResult<ModRecord> {
        let response = self
            .client
            .post(self.url("api/mods/suggest"))
            .json(partial)
            .send()
            .await?;
        Ok(response.error_for_status()?.json::<ModRecord>().await?)
    }

    async fn publish_record(&self, record: &ModRecord) -> CoreResult<String> {
        let response = self
            .client
            .post(self.url("api/mods"))
            .json(record)
            .send()
            .await?;
        let published = response.error_for_status()?.json::<PublishResponse>().await?;
        Ok(published.id)
    }

    async fn submit_version(
        &self,
        mod_id: &str,
        content_hash: &str,
        version: &str,
    ) -> CoreResult<()> {
        let submission = VersionSubmission {
            hash: content_hash,
            version,
        };
        let response = self
            .client
            .post(self.url(&format!("api/mods/{mod_id}/versions")))
            .json(&submission)
            .send()
            .await?;
        response.error_for_status().map_err(CoreError::from)?;
        Ok(())
    }
}
