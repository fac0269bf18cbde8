//! Builds the `/tracks.json` mapping from a full storage listing.

use std::sync::Arc;
use std::time::Duration;

use gx365_common::{Admission, ReleasePolicy, TrackMapping};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::store::{ObjectStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to list storage: {0}")]
    Listing(#[from] StoreError),
}

/// Memo of the last resolved mapping, reused for at most `ttl`.
///
/// Advisory only: a stale entry can hide a freshly released track for a
/// while, but the audio endpoint never reads from here.
pub struct MappingCache {
    ttl: Duration,
    entry: RwLock<Option<CachedMapping>>,
}

struct CachedMapping {
    resolved_at: Instant,
    mapping: TrackMapping,
}

impl MappingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn fresh(&self) -> Option<TrackMapping> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|cached| cached.resolved_at.elapsed() < self.ttl)
            .map(|cached| cached.mapping.clone())
    }

    async fn store(&self, mapping: TrackMapping) {
        *self.entry.write().await = Some(CachedMapping {
            resolved_at: Instant::now(),
            mapping,
        });
    }
}

pub struct MappingResolver {
    store: Arc<dyn ObjectStore>,
    policy: ReleasePolicy,
    cache: Option<MappingCache>,
}

impl MappingResolver {
    pub fn new(store: Arc<dyn ObjectStore>, policy: ReleasePolicy) -> Self {
        Self {
            store,
            policy,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: MappingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Mapping of every released or test track to its storage key.
    ///
    /// A listing failure is an error, never an empty or partial mapping:
    /// clients read an empty mapping as "nothing released yet".
    pub async fn resolve(&self) -> Result<TrackMapping, ResolveError> {
        if let Some(cache) = &self.cache {
            if let Some(mapping) = cache.fresh().await {
                debug!("serving cached mapping ({} tracks)", mapping.len());
                return Ok(mapping);
            }
        }

        let mapping = self.resolve_uncached().await?;

        if let Some(cache) = &self.cache {
            cache.store(mapping.clone()).await;
        }
        Ok(mapping)
    }

    async fn resolve_uncached(&self) -> Result<TrackMapping, ResolveError> {
        let keys = self.store.list_keys().await?;
        let total = keys.len();
        let cutoff = self.policy.current_cutoff();

        let mut mapping = TrackMapping::new();
        for key in keys {
            if let Admission::Released { id, .. } = self.policy.admit(&key, cutoff) {
                // Later keys in listing order win.
                if let Some(previous) = mapping.insert(id, key.clone()) {
                    debug!("track {id}: {key} replaces {previous}");
                }
            }
        }

        info!(
            "resolved {} tracks from {total} stored keys at cutoff {cutoff}",
            mapping.len()
        );
        Ok(mapping)
    }
}
