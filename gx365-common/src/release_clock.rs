use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::track_id::{TrackId, LAST_TRACK};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Highest track identifier released at some instant, in `0..=365`.
///
/// 0 means nothing is out yet, 365 means the whole year is out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cutoff(u16);

impl Cutoff {
    pub const NOTHING: Cutoff = Cutoff(0);
    pub const EVERYTHING: Cutoff = Cutoff(LAST_TRACK);

    /// Cutoff for `release_year` as observed at `now`.
    pub fn at(release_year: i32, now: DateTime<Utc>) -> Self {
        let observed_year = now.year();
        if observed_year < release_year {
            return Self::NOTHING;
        }
        if observed_year > release_year {
            return Self::EVERYTHING;
        }

        // ordinal() is 1 on January 1st; a leap year's day 366 clamps to 365.
        Self::from_day(u16::try_from(now.ordinal()).unwrap_or(LAST_TRACK))
    }

    pub fn from_day(day: u16) -> Self {
        Self(day.min(LAST_TRACK))
    }

    pub fn day(self) -> u16 {
        self.0
    }

    /// Whether `id` is at or before this cutoff.
    pub fn allows(self, id: TrackId) -> bool {
        id.get() <= self.0
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The designated release year read through a [`Clock`].
///
/// The cutoff is recomputed on every call so a gate built on this never
/// serves stale authorization.
#[derive(Clone)]
pub struct ReleaseClock {
    release_year: i32,
    clock: Arc<dyn Clock>,
}

impl ReleaseClock {
    pub fn new(release_year: i32, clock: Arc<dyn Clock>) -> Self {
        Self {
            release_year,
            clock,
        }
    }

    pub fn system(release_year: i32) -> Self {
        Self::new(release_year, Arc::new(SystemClock))
    }

    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    pub fn current_cutoff(&self) -> Cutoff {
        Cutoff::at(self.release_year, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn nothing_released_before_the_year() {
        assert_eq!(Cutoff::at(2026, utc(2025, 12, 31, 23, 59, 59)), Cutoff::NOTHING);
        assert_eq!(Cutoff::at(2026, utc(1999, 6, 1, 0, 0, 0)).day(), 0);
    }

    #[test]
    fn everything_released_after_the_year() {
        assert_eq!(Cutoff::at(2026, utc(2027, 1, 1, 0, 0, 0)), Cutoff::EVERYTHING);
        assert_eq!(Cutoff::at(2026, utc(2031, 3, 4, 5, 6, 7)).day(), 365);
    }

    #[test]
    fn first_day_starts_at_midnight_utc() {
        assert_eq!(Cutoff::at(2026, utc(2026, 1, 1, 0, 0, 0)).day(), 1);
        assert_eq!(Cutoff::at(2026, utc(2026, 1, 1, 23, 59, 59)).day(), 1);
        assert_eq!(Cutoff::at(2026, utc(2026, 1, 2, 0, 0, 0)).day(), 2);
    }

    #[test]
    fn day_of_year_during_release_year() {
        assert_eq!(Cutoff::at(2026, utc(2026, 2, 1, 12, 0, 0)).day(), 32);
        assert_eq!(Cutoff::at(2026, utc(2026, 12, 31, 23, 0, 0)).day(), 365);
    }

    #[test]
    fn leap_day_366_clamps_to_365() {
        assert_eq!(Cutoff::at(2028, utc(2028, 2, 29, 0, 0, 0)).day(), 60);
        assert_eq!(Cutoff::at(2028, utc(2028, 12, 31, 10, 0, 0)).day(), 365);
    }

    #[test]
    fn allows_is_inclusive() {
        let cutoff = Cutoff::from_day(10);
        assert!(cutoff.allows(TrackId::new(10).unwrap()));
        assert!(cutoff.allows(TrackId::new(1).unwrap()));
        assert!(!cutoff.allows(TrackId::new(11).unwrap()));
        assert!(!Cutoff::NOTHING.allows(TrackId::new(1).unwrap()));
        assert!(Cutoff::EVERYTHING.allows(TrackId::new(365).unwrap()));
    }

    #[test]
    fn release_clock_reads_injected_clock() {
        let clock = ReleaseClock::new(2026, Arc::new(FixedClock(utc(2026, 1, 15, 8, 0, 0))));
        assert_eq!(clock.release_year(), 2026);
        assert_eq!(clock.current_cutoff().day(), 15);
    }
}
