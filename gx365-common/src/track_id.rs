use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const FIRST_TRACK: u16 = 1;
pub const LAST_TRACK: u16 = 365;

/// Marker used when no other is configured.
pub const DEFAULT_TEST_MARKER: &str = "gxtest";

/// A release slot: the day of the release year a track unlocks on.
///
/// Never stored on its own. Always re-derived from a storage key with
/// [`TrackId::from_key`], which both the mapping endpoint and the audio
/// endpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(u16);

impl TrackId {
    /// `None` unless `value` is in `1..=365`.
    pub fn new(value: u16) -> Option<Self> {
        (FIRST_TRACK..=LAST_TRACK)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Display label, e.g. `#007`.
    pub fn label(self) -> String {
        format!("#{:03}", self.0)
    }

    /// Every slot of the year, in order.
    pub fn all() -> impl Iterator<Item = TrackId> {
        (FIRST_TRACK..=LAST_TRACK).map(Self)
    }

    /// Extract the track identifier from a storage key.
    ///
    /// Takes the first run of exactly three ASCII digits that is bounded by
    /// non-digits or the ends of the key. Only that first run counts: if it
    /// falls outside `1..=365` the key has no identifier, even when a later
    /// run would have been valid.
    pub fn from_key(key: &str) -> Option<Self> {
        let captures = track_number_pattern().captures(key)?;
        let value: u16 = captures.get(1)?.as_str().parse().ok()?;
        Self::new(value)
    }
}

fn track_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])([0-9]{3})(?:[^0-9]|$)").expect("track number pattern")
    })
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        TrackId::new(value)
            .ok_or_else(|| D::Error::custom(format!("track id {value} outside 1..=365")))
    }
}

/// Case-insensitive key marker that exempts an object from release gating.
///
/// Test status depends on the key text only, never on the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMarker(String);

impl TestMarker {
    pub fn new(marker: &str) -> Self {
        Self(marker.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `key` is a test asset. An empty marker matches nothing.
    pub fn matches(&self, key: &str) -> bool {
        !self.0.is_empty() && key.to_lowercase().contains(&self.0)
    }
}

impl Default for TestMarker {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_MARKER)
    }
}
