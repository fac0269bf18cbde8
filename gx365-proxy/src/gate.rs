//! Authorization for `/audio/<key>` requests.
//!
//! Every request is re-checked against a freshly computed cutoff, whatever
//! the mapping said. Clients can race a day boundary or skip the mapping
//! and guess keys directly.

use std::sync::Arc;

use gx365_common::{Admission, Cutoff, ReleasePolicy, TrackId};
use tracing::{debug, warn};

use crate::store::{ByteRange, ObjectStore, StoreError, StoredObject};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    #[error("track {id} not released (cutoff {cutoff})")]
    Forbidden { id: TrackId, cutoff: Cutoff },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("range not satisfiable: {0}")]
    RangeNotSatisfiable(String),
    #[error("internal error: {0}")]
    Internal(#[source] StoreError),
}

impl GateError {
    /// Only internal failures are worth retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GateError::Internal(_))
    }
}

/// A released object ready to be sent.
#[derive(Debug)]
pub struct ReleasedAsset {
    pub id: TrackId,
    pub object: StoredObject,
}

pub struct AssetGate {
    store: Arc<dyn ObjectStore>,
    policy: ReleasePolicy,
}

impl AssetGate {
    pub fn new(store: Arc<dyn ObjectStore>, policy: ReleasePolicy) -> Self {
        Self { store, policy }
    }

    pub async fn authorize_and_fetch(
        &self,
        requested_key: &str,
        range: Option<ByteRange>,
    ) -> Result<ReleasedAsset, GateError> {
        if requested_key.is_empty() {
            return Err(GateError::BadRequest("Filename required"));
        }
        if !is_plain_key(requested_key) {
            return Err(GateError::BadRequest("Invalid track filename"));
        }

        let cutoff = self.policy.current_cutoff();
        let id = match self.policy.admit(requested_key, cutoff) {
            Admission::Unrecognized => {
                return Err(GateError::BadRequest("Invalid track filename"));
            }
            Admission::Embargoed { id, cutoff } => {
                debug!("refusing {requested_key}: track {id} after cutoff {cutoff}");
                return Err(GateError::Forbidden { id, cutoff });
            }
            Admission::Released { id, .. } => id,
        };

        match self.store.get(requested_key, range).await {
            Ok(Some(object)) => Ok(ReleasedAsset { id, object }),
            Ok(None) => Err(GateError::NotFound(requested_key.to_string())),
            Err(StoreError::InvalidRange(key)) => Err(GateError::RangeNotSatisfiable(key)),
            Err(err) => {
                warn!("failed to read {requested_key} at cutoff {cutoff}: {err}");
                Err(GateError::Internal(err))
            }
        }
    }
}

/// Reject keys that could address anything other than a plain object:
/// absolute paths, `.`/`..` or empty segments, backslashes, control chars.
fn is_plain_key(key: &str) -> bool {
    !key.starts_with('/')
        && !key.contains('\\')
        && !key.chars().any(char::is_control)
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
