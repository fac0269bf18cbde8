use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::track_id::TrackId;

/// Point-in-time view of released tracks: identifier to storage key.
///
/// Serializes as a JSON object keyed by the identifier in decimal with no
/// leading zeros, e.g. `{"5": "track_005.mp3"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackMapping(BTreeMap<TrackId, String>);

impl TrackMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning the key it replaced for the same track.
    pub fn insert(&mut self, id: TrackId, key: String) -> Option<String> {
        self.0.insert(id, key)
    }

    pub fn get(&self, id: TrackId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &str)> {
        self.0.iter().map(|(id, key)| (*id, key.as_str()))
    }
}

impl FromIterator<(TrackId, String)> for TrackMapping {
    fn from_iter<I: IntoIterator<Item = (TrackId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
