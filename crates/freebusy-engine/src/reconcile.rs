//! Merge coarse free/busy blocks with detailed appointments.
//!
//! Free/busy data decides *which* time is busy: one block is produced per
//! `FreeBusy::all` range, never more and never fewer. Appointments only
//! enrich those blocks, and only when they lie entirely inside one. An
//! appointment that starts inside a block but runs past its end is not
//! attached, and appointments outside every block are dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::freebusy::{BusyStatus, FreeBusy};
use crate::interval_tree::{IntervalTree, MatchMode};
use crate::range::TimeRange;

/// Anything that occupies a span of time.
pub trait Scheduled {
    fn time_range(&self) -> TimeRange;
}

/// A calendar appointment as delivered by the remote store.
///
/// Only `start` and `end` matter to reconciliation; the rest is carried
/// through for the event writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_busy")]
    pub busy_status: BusyStatus,
    #[serde(default)]
    pub all_day: bool,
}

fn default_busy() -> BusyStatus {
    BusyStatus::Busy
}

impl Appointment {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            subject: None,
            location: None,
            start,
            end,
            busy_status: BusyStatus::Busy,
            all_day: false,
        }
    }
}

impl Scheduled for Appointment {
    fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// One free/busy block with the appointments that fall inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeBusyTimeBlock<A> {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub appointments: Vec<A>,
}

impl<A> FreeBusyTimeBlock<A> {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Blocks keyed by their start instant, iterated in start order.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyTimes<A> {
    blocks: BTreeMap<DateTime<Utc>, FreeBusyTimeBlock<A>>,
    unattached: usize,
}

impl<A> Default for BusyTimes<A> {
    fn default() -> Self {
        Self {
            blocks: BTreeMap::new(),
            unattached: 0,
        }
    }
}

impl<A> BusyTimes<A> {
    pub fn get(&self, start: &DateTime<Utc>) -> Option<&FreeBusyTimeBlock<A>> {
        self.blocks.get(start)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Appointments that fit inside no block and were dropped.
    pub fn unattached(&self) -> usize {
        self.unattached
    }

    pub fn blocks(&self) -> impl Iterator<Item = &FreeBusyTimeBlock<A>> {
        self.blocks.values()
    }

    pub fn into_blocks(self) -> Vec<FreeBusyTimeBlock<A>> {
        self.blocks.into_values().collect()
    }

    fn insert(&mut self, block: FreeBusyTimeBlock<A>) {
        self.blocks.insert(block.start, block);
    }
}

impl<A: Serialize> Serialize for BusyTimes<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.blocks.values())
    }
}

/// Attach each appointment to the `all` block that fully contains it.
///
/// Every `all` range yields a block, with an empty appointment list when
/// nothing fits. Two `all` ranges sharing a start collapse into the later one.
pub fn merge<A: Scheduled + Clone>(free_busy: &FreeBusy, appointments: Vec<A>) -> BusyTimes<A> {
    let tree: IntervalTree<TimeRange, usize> = appointments
        .iter()
        .enumerate()
        .map(|(idx, a)| (a.time_range(), idx))
        .collect();

    // Block range plus the indices of the appointments inside it.
    let mut matched: BTreeMap<DateTime<Utc>, (TimeRange, Vec<usize>)> = BTreeMap::new();
    for range in &free_busy.all {
        let inside = tree
            .find_all(range, MatchMode::Contained)
            .into_iter()
            .map(|(_, &idx)| idx)
            .collect();
        if let Some((previous, _)) = matched.insert(range.start, (*range, inside)) {
            tracing::debug!(
                start = %previous.start,
                dropped_end = %previous.end,
                "duplicate free/busy start, keeping the later block"
            );
        }
    }

    let mut attached = vec![false; appointments.len()];
    let mut result = BusyTimes::default();
    for (range, inside) in matched.into_values() {
        let block = FreeBusyTimeBlock {
            start: range.start,
            end: range.end,
            appointments: inside
                .into_iter()
                .map(|idx| {
                    attached[idx] = true;
                    appointments[idx].clone()
                })
                .collect(),
        };
        result.insert(block);
    }

    result.unattached = attached.iter().filter(|hit| !**hit).count();
    tracing::debug!(
        blocks = result.len(),
        appointments = appointments.len(),
        unattached = result.unattached,
        "reconciled free/busy with appointments"
    );

    result
}
