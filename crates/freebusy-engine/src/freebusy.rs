//! Per-user free/busy model.
//!
//! A [`FreeBusy`] holds the ranges a codec produced, split by status. `all`
//! is the "unavailable for scheduling" view: it receives every Busy and
//! OutOfOffice range but never a Tentative one. Lists keep the order in which
//! ranges were pushed; nothing here sorts them.

use serde::{Deserialize, Serialize};

use crate::range::TimeRange;

/// Availability classification of a stretch of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyStatus {
    #[default]
    Free,
    Tentative,
    Busy,
    OutOfOffice,
}

/// Free/busy ranges for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusy {
    #[serde(default)]
    pub all: Vec<TimeRange>,
    #[serde(default)]
    pub busy: Vec<TimeRange>,
    #[serde(default)]
    pub tentative: Vec<TimeRange>,
    #[serde(default)]
    pub out_of_office: Vec<TimeRange>,
}

impl FreeBusy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-status lists. `all` becomes busy followed by out-of-office.
    pub fn from_status_ranges(
        busy: Vec<TimeRange>,
        tentative: Vec<TimeRange>,
        out_of_office: Vec<TimeRange>,
    ) -> Self {
        let all = busy.iter().chain(out_of_office.iter()).copied().collect();
        Self {
            all,
            busy,
            tentative,
            out_of_office,
        }
    }

    /// Append a range under `status`. Free ranges are not recorded.
    pub fn push(&mut self, status: BusyStatus, range: TimeRange) {
        match status {
            BusyStatus::Free => {}
            BusyStatus::Tentative => self.tentative.push(range),
            BusyStatus::Busy => {
                self.all.push(range);
                self.busy.push(range);
            }
            BusyStatus::OutOfOffice => {
                self.all.push(range);
                self.out_of_office.push(range);
            }
        }
    }

    /// The list holding `status`. `Free` maps to an empty slice.
    pub fn ranges(&self, status: BusyStatus) -> &[TimeRange] {
        match status {
            BusyStatus::Free => &[],
            BusyStatus::Tentative => &self.tentative,
            BusyStatus::Busy => &self.busy,
            BusyStatus::OutOfOffice => &self.out_of_office,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.tentative.is_empty()
    }

    pub fn clear(&mut self) {
        self.all.clear();
        self.busy.clear();
        self.tentative.clear();
        self.out_of_office.clear();
    }
}

/// Merge overlapping or touching ranges.
///
/// Returns a sorted, non-overlapping list. Inverted ranges are dropped.
pub fn condense(ranges: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted: Vec<TimeRange> = ranges
        .iter()
        .filter(|r| r.start <= r.end)
        .copied()
        .collect();

    // Sort by start time (then by end time for stability).
    sorted.sort();

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end {
                // Overlapping or adjacent: extend the current range.
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }

    merged
}
