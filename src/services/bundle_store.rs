//! Cross-run storage of detected bundles (Supabase PostgREST `bundles` table).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::interfaces::{BundleRecord, PersistenceSummary, SuspectScore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpStatus(StatusCode),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid credentials header: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),
}

#[async_trait]
pub trait BundleStore: Send + Sync {
    async fn exists(&self, chain_id: &str, suspect_address: &str) -> Result<bool, StoreError>;

    /// Insert or merge on `(chain_id, suspect_address)`.
    async fn upsert(&self, record: &BundleRecord) -> Result<(), StoreError>;

    fn backend_type(&self) -> &'static str;
}

pub struct SupabaseStore {
    bundles_url: Url,
    http: Client,
}

impl SupabaseStore {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        let bundles_url = base.join("rest/v1/bundles")?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key)?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("prefer", HeaderValue::from_static("resolution=merge-duplicates"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { bundles_url, http })
    }

    pub fn host(&self) -> &str {
        self.bundles_url.host_str().unwrap_or("unknown host")
    }

    pub fn bundles_url(&self) -> &Url {
        &self.bundles_url
    }
}

#[async_trait]
impl BundleStore for SupabaseStore {
    async fn exists(&self, chain_id: &str, suspect_address: &str) -> Result<bool, StoreError> {
        let response = self
            .http
            .get(self.bundles_url.clone())
            .query(&[
                ("select", "id".to_string()),
                ("chain_id", format!("eq.{}", chain_id)),
                ("suspect_address", format!("eq.{}", suspect_address)),
            ])
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(StoreError::HttpStatus(response.status()));
        }
        let rows: Vec<Value> = serde_json::from_str(&response.text().await?)?;
        Ok(!rows.is_empty())
    }

    async fn upsert(&self, record: &BundleRecord) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.bundles_url.clone())
            .query(&[("on_conflict", "chain_id,suspect_address")])
            .json(record)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => Err(StoreError::HttpStatus(status)),
        }
    }

    fn backend_type(&self) -> &'static str {
        "Supabase"
    }
}

/// Stores every suspect at or above `threshold`.
///
/// Suspects already in the store are skipped unless `refresh_known` is set.
/// A failed `exists` check falls through to the upsert. Errors are counted,
/// never returned.
pub async fn persist_bundles(
    store: &dyn BundleStore,
    chain_id: &str,
    suspects: &[SuspectScore],
    threshold: f64,
    refresh_known: bool,
) -> PersistenceSummary {
    let mut summary = PersistenceSummary::default();

    for suspect in suspects.iter().filter(|s| s.is_bundle(threshold)) {
        summary.checked += 1;

        if !refresh_known {
            match store.exists(chain_id, &suspect.suspect_address).await {
                Ok(true) => {
                    summary.already_known += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        backend = store.backend_type(),
                        suspect = %suspect.suspect_address,
                        error = %e,
                        "bundle lookup failed"
                    );
                }
            }
        }

        let record = BundleRecord::from_suspect(chain_id, suspect, chrono::Utc::now());
        match store.upsert(&record).await {
            Ok(()) => summary.inserted += 1,
            Err(e) => {
                tracing::warn!(
                    backend = store.backend_type(),
                    suspect = %suspect.suspect_address,
                    error = %e,
                    "bundle upsert failed"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
