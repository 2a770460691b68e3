//! Legacy per-slot status raster.
//!
//! One character per fixed-size slot, slot `i` covering
//! `[start + i * slot, start + (i + 1) * slot)`:
//!
//! | char | status |
//! |------|--------|
//! | `0` | Free |
//! | `1` | Tentative |
//! | `2` | Busy |
//! | `3` | OutOfOffice |
//! | anything else, `4` included | Free |
//!
//! Decoding collapses runs of equal non-free slots into one range and never
//! fails: unknown characters simply end the current run.

use chrono::{DateTime, Duration, Utc};

use crate::freebusy::{BusyStatus, FreeBusy};
use crate::range::TimeRange;

impl BusyStatus {
    pub fn from_raster_char(c: char) -> Self {
        match c {
            '1' => BusyStatus::Tentative,
            '2' => BusyStatus::Busy,
            '3' => BusyStatus::OutOfOffice,
            _ => BusyStatus::Free,
        }
    }

    pub fn to_raster_char(self) -> char {
        match self {
            BusyStatus::Free => '0',
            BusyStatus::Tentative => '1',
            BusyStatus::Busy => '2',
            BusyStatus::OutOfOffice => '3',
        }
    }
}

fn slot_range(start: DateTime<Utc>, slot: Duration, first: usize, end: usize) -> TimeRange {
    TimeRange::new(start + slot * first as i32, start + slot * end as i32)
}

/// Decode `raster` into `out`, appending to its per-status lists.
pub fn decode_raster(start: DateTime<Utc>, slot_minutes: u32, raster: &str, out: &mut FreeBusy) {
    let slot = Duration::minutes(i64::from(slot_minutes));
    let mut run: Option<(BusyStatus, usize)> = None;
    let mut len = 0;

    for (idx, c) in raster.chars().enumerate() {
        len = idx + 1;
        let status = BusyStatus::from_raster_char(c);

        if let Some((current, first)) = run {
            if current == status {
                continue;
            }
            out.push(current, slot_range(start, slot, first, idx));
            run = None;
        }

        if status != BusyStatus::Free {
            run = Some((status, idx));
        }
    }

    if let Some((current, first)) = run {
        out.push(current, slot_range(start, slot, first, len));
    }
}

/// Render `slot_count` slots of `fb` as a raster string.
///
/// Each slot takes the strongest status with a range touching it, ranked
/// `OutOfOffice > Busy > Tentative > Free`. A zero-length range marks the slot
/// containing its instant.
pub fn encode_raster(
    start: DateTime<Utc>,
    slot_minutes: u32,
    slot_count: usize,
    fb: &FreeBusy,
) -> String {
    const STRENGTH: [BusyStatus; 3] = [
        BusyStatus::OutOfOffice,
        BusyStatus::Busy,
        BusyStatus::Tentative,
    ];

    let slot = Duration::minutes(i64::from(slot_minutes));

    (0..slot_count)
        .map(|idx| {
            let TimeRange {
                start: slot_start,
                end: slot_end,
            } = slot_range(start, slot, idx, idx + 1);
            let touches = |r: &TimeRange| {
                if r.is_empty() {
                    slot_start <= r.start && r.start < slot_end
                } else {
                    r.start < slot_end && r.end > slot_start
                }
            };

            STRENGTH
                .iter()
                .find(|status| fb.ranges(**status).iter().any(touches))
                .copied()
                .unwrap_or_default()
                .to_raster_char()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_chars_round_trip() {
        for status in [
            BusyStatus::Free,
            BusyStatus::Tentative,
            BusyStatus::Busy,
            BusyStatus::OutOfOffice,
        ] {
            assert_eq!(BusyStatus::from_raster_char(status.to_raster_char()), status);
        }
    }

    #[test]
    fn everything_outside_alphabet_is_free() {
        for c in (' '..='\u{ff}').filter(|c| !('1'..='3').contains(c)) {
            assert_eq!(BusyStatus::from_raster_char(c), BusyStatus::Free, "char {c:?}");
        }
    }
}
