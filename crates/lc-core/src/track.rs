//! The clamped heat track.
//!
//! A write that would push heat past its capacity clamps at the cap and
//! reports the excess so callers can surface an overheat.

use serde::{Deserialize, Serialize};

/// A named resource clamped between `min` and `max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name of the track.
    pub name: String,
    /// Current value.
    pub current: i32,
    /// Capacity.
    pub max: i32,
    /// Floor (usually 0).
    #[serde(default)]
    pub min: i32,
}

/// Outcome of an [`Track::apply`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChange {
    /// Value before the change.
    pub before: i32,
    /// Value after clamping.
    pub after: i32,
    /// Amount that did not fit above `max`. Zero when nothing overflowed.
    pub overflow: i32,
}

impl Track {
    /// A track with explicit bounds; `current` is clamped into them.
    pub fn with_range(name: impl Into<String>, current: i32, min: i32, max: i32) -> Self {
        Self {
            name: name.into(),
            current: current.clamp(min, max),
            max,
            min,
        }
    }

    /// Apply a delta, clamping to bounds, and report what happened.
    pub fn apply(&mut self, delta: i32) -> TrackChange {
        let before = self.current;
        let raw = before.saturating_add(delta);
        self.current = raw.clamp(self.min, self.max);
        TrackChange {
            before,
            after: self.current,
            overflow: raw.saturating_sub(self.max).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_track_starts_empty() {
        let t = Track::with_range("Heat", 0, 0, 6);
        assert_eq!(t.current, 0);
        assert_eq!(t.max, 6);
    }

    #[test]
    fn apply_within_bounds() {
        let mut t = Track::with_range("Heat", 1, 0, 6);
        let change = t.apply(3);
        assert_eq!(change.before, 1);
        assert_eq!(change.after, 4);
        assert_eq!(change.overflow, 0);
    }

    #[test]
    fn apply_reports_overflow() {
        let mut t = Track::with_range("Heat", 4, 0, 6);
        let change = t.apply(5);
        assert_eq!(change.after, 6);
        assert_eq!(change.overflow, 3);
        assert_eq!(t.current, t.max);
    }

    #[test]
    fn apply_clamps_to_floor() {
        let mut t = Track::with_range("Heat", 2, 0, 6);
        let change = t.apply(-10);
        assert_eq!(change.after, 0);
        assert_eq!(change.overflow, 0);
    }

    #[test]
    fn with_range_clamps_initial() {
        let t = Track::with_range("Heat", 100, 0, 10);
        assert_eq!(t.current, 10);
    }

    #[test]
    fn huge_delta_saturates() {
        let mut t = Track::with_range("Heat", 3, 0, 6);
        let change = t.apply(i32::MAX);
        assert_eq!(change.after, 6);
        assert_eq!(change.overflow, i32::MAX - 6);
    }

    proptest::proptest! {
        #[test]
        fn apply_stays_in_bounds(start in 0i32..=6, delta in -20i32..=20) {
            let mut t = Track::with_range("Heat", start, 0, 6);
            let change = t.apply(delta);
            proptest::prop_assert!((0..=6).contains(&change.after));
            proptest::prop_assert!(change.overflow >= 0);
            proptest::prop_assert_eq!(change.after + change.overflow, (start + delta).max(0));
        }
    }
}
