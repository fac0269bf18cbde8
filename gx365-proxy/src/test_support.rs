//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use gx365_common::{FixedClock, ReleaseClock, ReleasePolicy, TestMarker};

pub const RELEASE_YEAR: i32 = 2026;

/// A 2026 release policy frozen at noon UTC on the day giving `cutoff`.
/// Cutoff 0 is the last day of 2025.
pub fn policy_at(cutoff: u16) -> ReleasePolicy {
    let jan_first = Utc
        .with_ymd_and_hms(RELEASE_YEAR, 1, 1, 12, 0, 0)
        .unwrap();
    let now = jan_first + Duration::days(i64::from(cutoff) - 1);
    ReleasePolicy::new(
        ReleaseClock::new(RELEASE_YEAR, Arc::new(FixedClock(now))),
        TestMarker::default(),
    )
}
