//! Audio blob store adapter.
//!
//! `BlobStore` is a minimal put-and-get-URL contract; `BucketClient`
//! implements it against a Supabase-storage-style object API. The public
//! URL scheme is derived from the base URL and bucket, so a successful
//! upload always yields a dereferenceable reference.

use async_trait::async_trait;
use tracing::debug;

use medibridge_core::config::BlobConfig;

use crate::error::EngineError;

/// Contract for a remote blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return a public URL for the object.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, EngineError>;
}

/// HTTP client for an object-storage bucket.
pub struct BucketClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    bucket: String,
}

impl BucketClient {
    /// Build a client from configuration. Fails if the API key or base URL
    /// is empty.
    pub fn new(config: &BlobConfig) -> Result<Self, EngineError> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::Config("blob api_key is empty".into()));
        }
        if config.base_url.trim().is_empty() {
            return Err(EngineError::Config("blob base_url is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl BlobStore for BucketClient {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, EngineError> {
        debug!(key, size = bytes.len(), "Uploading blob");

        let response = self
            .http
            .post(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(key))
    }
}
