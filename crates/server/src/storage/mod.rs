use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use shared_types::AppError;
use tokio::sync::RwLock;

use crate::config::{env_nonempty, env_or};

/// Default presign expiry (15 minutes).
const PRESIGN_EXPIRY_SECS: u64 = 900;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage is not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::not_found("Stored file not found"),
            other => AppError::external("Document storage unavailable").with_detail(other),
        }
    }
}

/// Object storage for uploaded documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Short-lived download URL, or `None` when the backend cannot presign.
    async fn presign_get(&self, key: &str) -> Result<Option<String>, StorageError>;
}

pub type DynObjectStore = Arc<dyn ObjectStore>;

// ── S3 implementation ───────────────────────────────────────────────

/// Supabase Storage through its S3-compatible endpoint.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build from environment variables:
    ///   - `SUPABASE_S3_ENDPOINT` / `S3_ENDPOINT` (default `{SUPABASE_URL}/storage/v1/s3`)
    ///   - `SUPABASE_S3_ACCESS_KEY_ID` / `S3_ACCESS_KEY`
    ///   - `SUPABASE_S3_SECRET_ACCESS_KEY` / `S3_SECRET_KEY`
    ///   - `SUPABASE_S3_REGION` / `S3_REGION`
    ///   - `SUPABASE_STORAGE_BUCKET` (default `documents`)
    pub fn from_env() -> Result<Self, StorageError> {
        let endpoint = env_or("SUPABASE_S3_ENDPOINT", "S3_ENDPOINT")
            .or_else(|| {
                env_nonempty("SUPABASE_URL")
                    .map(|u| format!("{}/storage/v1/s3", u.trim_end_matches('/')))
            })
            .ok_or(StorageError::NotConfigured("SUPABASE_S3_ENDPOINT or SUPABASE_URL"))?;
        let access_key = env_or("SUPABASE_S3_ACCESS_KEY_ID", "S3_ACCESS_KEY")
            .ok_or(StorageError::NotConfigured("SUPABASE_S3_ACCESS_KEY_ID"))?;
        let secret_key = env_or("SUPABASE_S3_SECRET_ACCESS_KEY", "S3_SECRET_KEY")
            .ok_or(StorageError::NotConfigured("SUPABASE_S3_SECRET_ACCESS_KEY"))?;
        let region = env_or("SUPABASE_S3_REGION", "S3_REGION")
            .unwrap_or_else(|| "ap-south-1".to_string());
        let bucket = env_nonempty("SUPABASE_STORAGE_BUCKET").unwrap_or_else(|| "documents".to_string());

        let creds = Credentials::new(&access_key, &secret_key, None, None, "env");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(&endpoint)
            .region(Region::new(region))
            .credentials_provider(creds)
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        Ok(Self {
            client: Client::from_conf(config),
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                let svc = e.into_service_error();
                tracing::error!(key, error = ?svc, "S3 PutObject failed");
                StorageError::Backend(svc.to_string())
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let svc = e.into_service_error();
                if svc.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    tracing::error!(key, error = ?svc, "S3 GetObject failed");
                    StorageError::Backend(svc.to_string())
                }
            })?;

        resp.body
            .collect()
            .await
            .map(|data| data.into_bytes().to_vec())
            .map_err(|e| StorageError::Backend(format!("failed to read object body: {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.into_service_error().to_string()))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let presign_config = PresigningConfig::builder()
            .expires_in(Duration::from_secs(PRESIGN_EXPIRY_SECS))
            .build()
            .map_err(|e| StorageError::Backend(format!("presign config: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::Backend(format!("presign GET failed: {e}")))?;

        Ok(Some(presigned.uri().to_string()))
    }
}

// ── In-memory implementation ────────────────────────────────────────

/// Process-local store used when the `storage` flag is off and in tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().await.get(key).map(|(ct, _)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}
