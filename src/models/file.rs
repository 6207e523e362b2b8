use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Content-addressed reference to an uploaded document.
///
/// Whether a document exists is decided by the reference alone; fetching the
/// bytes goes through a [`crate::repository::FileStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Lowercase hex SHA-256 of the content
    pub digest: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRef {
    pub fn for_content(
        file: &UploadedFile,
        uploaded_by: Uuid,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            digest: content_digest(&file.bytes),
            name: file.name.clone(),
            size: file.bytes.len() as u64,
            content_type: file.content_type.clone(),
            uploaded_by,
            uploaded_at,
        }
    }
}

/// File bytes as received from the uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
