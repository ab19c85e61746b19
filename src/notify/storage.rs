use std::{
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, primitives::ByteStream};
use serde::Serialize;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: usize,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let size = data.len();
        fs::write(path, data).await?;
        Ok(StoredObject {
            key: key.to_string(),
            url: public_url(&self.public_base_url, key),
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.base_path.join(key);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        Ok(StoredObject {
            key: key.to_string(),
            url: public_url(&self.public_base_url, key),
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;
        Ok(())
    }
}

/// In-memory storage for tests; can be told to fail the first N uploads.
pub struct MockStorage {
    failures_left: AtomicU32,
    attempts: AtomicU32,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploaded.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::Upload("mock upload failure".to_string()));
        }
        self.uploaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
        Ok(StoredObject {
            key: key.to_string(),
            url: public_url("https://files.test", key),
            size: data.len(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deleted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
        Ok(())
    }
}
