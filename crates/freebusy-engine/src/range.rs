//! The time-range primitive shared by every codec and the interval tree.
//!
//! Ranges compare inclusively at both ends: a range that ends exactly when
//! another starts overlaps it. `start <= end` is not enforced, so callers may
//! carry zero-length markers (`start == end`) and even inverted ranges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed span of time. Ordered by `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the two ranges share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Zero-length marker.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} - {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Anything with a low and high bound that the interval tree can index.
pub trait Interval {
    type Point: Ord + Copy;

    fn low(&self) -> Self::Point;
    fn high(&self) -> Self::Point;
}

impl Interval for TimeRange {
    type Point = DateTime<Utc>;

    fn low(&self) -> Self::Point {
        self.start
    }

    fn high(&self) -> Self::Point {
        self.end
    }
}

impl<T: Ord + Copy> Interval for (T, T) {
    type Point = T;

    fn low(&self) -> T {
        self.0
    }

    fn high(&self) -> T {
        self.1
    }
}
