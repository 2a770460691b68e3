//! Minute counts relative to the legacy store's system-time origin,
//! 1601-01-01T00:00:00Z.
//!
//! Plain elapsed-time arithmetic; no timezone normalization happens here.

use chrono::{DateTime, Duration, TimeDelta, Utc};

/// Seconds from the origin to the Unix epoch.
const UNIX_OFFSET_SECONDS: i64 = 11_644_473_600;

/// The origin of the minute count.
pub fn epoch() -> DateTime<Utc> {
    // `DateTime<Utc>::default()` is the Unix epoch.
    DateTime::<Utc>::default() - Duration::seconds(UNIX_OFFSET_SECONDS)
}

/// Whole minutes elapsed between the epoch and `t`. Seconds are truncated.
pub fn instant_to_epoch_minutes(t: DateTime<Utc>) -> i64 {
    (t - epoch()).num_minutes()
}

/// Inverse of [`instant_to_epoch_minutes`] for minute-aligned instants.
///
/// # Panics
/// When the instant falls outside the range `DateTime<Utc>` can hold. Use
/// [`try_epoch_minutes_to_instant`] for untrusted input.
pub fn epoch_minutes_to_instant(minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(minutes)
}

/// Checked [`epoch_minutes_to_instant`]; `None` when the result is out of range.
pub fn try_epoch_minutes_to_instant(minutes: i64) -> Option<DateTime<Utc>> {
    epoch().checked_add_signed(TimeDelta::try_minutes(minutes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn epoch_is_1601() {
        assert_eq!(epoch(), Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(instant_to_epoch_minutes(epoch()), 0);
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        assert_eq!(try_epoch_minutes_to_instant(i64::MAX), None);
        assert_eq!(try_epoch_minutes_to_instant(i64::MAX / 2), None);
        assert_eq!(try_epoch_minutes_to_instant(i64::MIN), None);
        // Representable as a duration, but past the last representable year.
        assert_eq!(try_epoch_minutes_to_instant(200_000_000_000), None);
        assert_eq!(
            try_epoch_minutes_to_instant(-1),
            Some(epoch() - Duration::minutes(1))
        );
        assert_eq!(try_epoch_minutes_to_instant(0), Some(epoch()));
    }

    #[test]
    fn seconds_are_truncated() {
        let t = Utc.with_ymd_and_hms(2008, 5, 1, 10, 0, 59).unwrap();
        let floor = Utc.with_ymd_and_hms(2008, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(instant_to_epoch_minutes(t), instant_to_epoch_minutes(floor));
    }
}
