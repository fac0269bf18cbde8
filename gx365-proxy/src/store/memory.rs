//! In-memory `ObjectStore` for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ByteRange, ObjectStore, StoreError, StoredObject};

/// Listing order is insertion order.
#[derive(Default)]
pub struct MemoryStore {
    objects: Vec<(String, Vec<u8>)>,
    list_calls: AtomicUsize,
    broken: AtomicBool,
    timing_out: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: &[&str]) -> Self {
        let mut store = Self::new();
        for key in keys {
            store.insert(key, format!("audio:{key}").into_bytes());
        }
        store
    }

    pub fn insert(&mut self, key: &str, body: Vec<u8>) {
        self.objects.push((key.to_string(), body));
    }

    /// Make every call fail with a storage error.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    /// Make every call fail with a timeout.
    pub fn set_timing_out(&self, timing_out: bool) {
        self.timing_out.store(timing_out, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_health(&self, op: &str) -> Result<(), StoreError> {
        if self.timing_out.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout(op.to_string()));
        }
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Storage(format!("{op}: backend unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_health("list")?;
        Ok(self.objects.iter().map(|(key, _)| key.clone()).collect())
    }

    async fn get(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<Option<StoredObject>, StoreError> {
        self.check_health(&format!("get {key}"))?;

        // Last insert wins, like an overwritten object.
        let Some((_, body)) = self.objects.iter().rev().find(|(k, _)| k == key) else {
            return Ok(None);
        };

        let total = body.len() as u64;
        let etag = Some(format!("\"{total:x}-{}\"", key.len()));
        let content_type = Some("audio/mpeg".to_string());

        let Some(range) = range else {
            return Ok(Some(StoredObject {
                body: body.clone(),
                content_type,
                etag,
                content_range: None,
            }));
        };

        if range.start >= total {
            return Err(StoreError::InvalidRange(key.to_string()));
        }
        let end = range.end.unwrap_or(total - 1).min(total - 1);
        Ok(Some(StoredObject {
            body: body[range.start as usize..=end as usize].to_vec(),
            content_type,
            etag,
            content_range: Some(format!("bytes {}-{end}/{total}", range.start)),
        }))
    }
}
