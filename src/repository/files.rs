use super::RepositoryResult;
use crate::models::file::content_digest;
use crate::models::{FileRef, UploadedFile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Content-addressed blob storage for uploaded documents
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store the bytes and return a reference; storing identical content twice is a no-op
    async fn store(
        &self,
        file: &UploadedFile,
        uploaded_by: Uuid,
        uploaded_at: DateTime<Utc>,
    ) -> RepositoryResult<FileRef>;

    async fn fetch(&self, digest: &str) -> RepositoryResult<Option<Vec<u8>>>;

    async fn contains(&self, digest: &str) -> RepositoryResult<bool>;
}

#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    blobs: DashMap<String, Vec<u8>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn store(
        &self,
        file: &UploadedFile,
        uploaded_by: Uuid,
        uploaded_at: DateTime<Utc>,
    ) -> RepositoryResult<FileRef> {
        let file_ref = FileRef::for_content(file, uploaded_by, uploaded_at);
        self.blobs
            .entry(file_ref.digest.clone())
            .or_insert_with(|| file.bytes.clone());
        Ok(file_ref)
    }

    async fn fetch(&self, digest: &str) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(digest).map(|b| b.value().clone()))
    }

    async fn contains(&self, digest: &str) -> RepositoryResult<bool> {
        Ok(self.blobs.contains_key(digest))
    }
}

/// Verify a reference against bytes fetched from a store
pub fn matches_content(file_ref: &FileRef, bytes: &[u8]) -> bool {
    file_ref.size == bytes.len() as u64 && file_ref.digest == content_digest(bytes)
}
