use crate::release_clock::{Cutoff, ReleaseClock};
use crate::track_id::{TestMarker, TrackId};

/// Outcome of checking one storage key against the release schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The key carries no valid track identifier.
    Unrecognized,
    /// A valid track whose day has not come yet.
    Embargoed { id: TrackId, cutoff: Cutoff },
    /// Released, either by date or because the key is a test asset.
    Released { id: TrackId, test_asset: bool },
}

impl Admission {
    pub fn is_released(&self) -> bool {
        matches!(self, Admission::Released { .. })
    }
}

/// The release rule shared by the mapping endpoint and the audio endpoint.
///
/// Both sides go through [`ReleasePolicy::admit`] so they can never
/// disagree about which keys are out.
#[derive(Clone)]
pub struct ReleasePolicy {
    clock: ReleaseClock,
    marker: TestMarker,
}

impl ReleasePolicy {
    pub fn new(clock: ReleaseClock, marker: TestMarker) -> Self {
        Self { clock, marker }
    }

    pub fn clock(&self) -> &ReleaseClock {
        &self.clock
    }

    pub fn marker(&self) -> &TestMarker {
        &self.marker
    }

    pub fn current_cutoff(&self) -> Cutoff {
        self.clock.current_cutoff()
    }

    pub fn is_test_asset(&self, key: &str) -> bool {
        self.marker.matches(key)
    }

    /// Classify `key` against `cutoff`.
    pub fn admit(&self, key: &str, cutoff: Cutoff) -> Admission {
        let Some(id) = TrackId::from_key(key) else {
            return Admission::Unrecognized;
        };

        let test_asset = self.is_test_asset(key);
        if test_asset || cutoff.allows(id) {
            Admission::Released { id, test_asset }
        } else {
            Admission::Embargoed { id, cutoff }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release_clock::SystemClock;
    use std::sync::Arc;

    fn policy() -> ReleasePolicy {
        ReleasePolicy::new(
            ReleaseClock::new(2026, Arc::new(SystemClock)),
            TestMarker::default(),
        )
    }

    fn track(n: u16) -> TrackId {
        TrackId::new(n).unwrap()
    }

    #[test]
    fn released_at_or_before_cutoff() {
        let policy = policy();
        for day in [1, 10, 365] {
            let cutoff = Cutoff::from_day(day);
            for n in [1, day] {
                let key = format!("track_{n:03}.mp3");
                assert_eq!(
                    policy.admit(&key, cutoff),
                    Admission::Released {
                        id: track(n),
                        test_asset: false
                    },
                    "{key} at cutoff {day}"
                );
            }
        }
    }

    #[test]
    fn embargoed_after_cutoff() {
        let policy = policy();
        for day in [0, 1, 10, 364] {
            let cutoff = Cutoff::from_day(day);
            let n = day + 1;
            let key = format!("track_{n:03}.mp3");
            assert_eq!(
                policy.admit(&key, cutoff),
                Admission::Embargoed {
                    id: track(n),
                    cutoff
                }
            );
        }
    }

    #[test]
    fn test_assets_bypass_cutoff() {
        let policy = policy();
        assert_eq!(
            policy.admit("GXTEST_300.mp3", Cutoff::NOTHING),
            Admission::Released {
                id: track(300),
                test_asset: true
            }
        );
    }

    #[test]
    fn test_assets_still_need_an_identifier() {
        let policy = policy();
        assert_eq!(
            policy.admit("gxtest_clip.mp3", Cutoff::EVERYTHING),
            Admission::Unrecognized
        );
    }

    #[test]
    fn unrecognized_keys() {
        let policy = policy();
        assert_eq!(
            policy.admit("weird_file.mp3", Cutoff::EVERYTHING),
            Admission::Unrecognized
        );
        assert!(!policy
            .admit("track_000.mp3", Cutoff::EVERYTHING)
            .is_released());
    }
}
