//! Object storage the release service reads audio from.
//!
//! The service only ever lists keys and reads objects. Uploads happen out
//! of band, so the trait has no write side.

#[cfg(test)]
pub mod memory;
pub mod s3;

use async_trait::async_trait;

/// Errors from raw storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("storage timed out: {0}")]
    Timeout(String),
    #[error("range not satisfiable: {0}")]
    InvalidRange(String),
}

/// A requested byte range. `start` is inclusive; `end` is inclusive and
/// open-ended when `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Value for an HTTP `Range` header.
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{end}", self.start),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// An object read from storage, with the metadata needed to answer over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    /// Set for ranged reads, e.g. `bytes 0-99/1000`.
    pub content_range: Option<String>,
}

impl StoredObject {
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Read-only key/value object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key in the store. Implementations exhaust pagination.
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Read the object at exactly `key`. `Ok(None)` when it does not exist.
    async fn get(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<Option<StoredObject>, StoreError>;
}
