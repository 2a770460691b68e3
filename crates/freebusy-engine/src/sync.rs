//! One sync pass in each direction.
//!
//! The scheduling harness owns timing and threads. It hands every invocation
//! an explicit [`SyncContext`] and gets a `Result` back carrying
//! [`SyncStats`]. Nothing here keeps state between passes, so independent
//! passes may run on different threads at the same time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::epoch::instant_to_epoch_minutes;
use crate::error::{FreeBusyError, Result};
use crate::freebusy::{condense, FreeBusy};
use crate::month_block::{MonthBlock, MonthBlockCodec};
use crate::range::TimeRange;
use crate::reconcile::{merge, BusyTimes, Scheduled};

/// Per-invocation context supplied by the harness.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub pass_id: u64,
    pub config: SyncConfig,
}

impl SyncContext {
    pub fn new(pass_id: u64, config: SyncConfig) -> Self {
        Self { pass_id, config }
    }

    /// The configured window starting at `start`.
    pub fn window_from(&self, start: DateTime<Utc>) -> TimeRange {
        TimeRange::new(start, start + Duration::days(i64::from(self.config.window_days)))
    }

    fn codec(&self) -> MonthBlockCodec {
        MonthBlockCodec::new(self.config.blob_format)
    }
}

/// Month blocks for each status, as the remote store keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBlocks {
    #[serde(default)]
    pub busy: Vec<MonthBlock>,
    #[serde(default)]
    pub tentative: Vec<MonthBlock>,
    #[serde(default)]
    pub out_of_office: Vec<MonthBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub pass_id: u64,
    pub blocks: usize,
    pub appointments_seen: usize,
    /// Distinct appointments placed in at least one block.
    pub appointments_attached: usize,
    pub months_written: usize,
}

#[derive(Debug, Clone)]
pub struct ReadOutcome<A> {
    pub busy_times: BusyTimes<A>,
    pub stats: SyncStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub busy: Vec<MonthBlock>,
    pub tentative: Vec<MonthBlock>,
    /// Window start in minutes since 1601-01-01.
    pub published_start: i64,
    /// Window end in minutes since 1601-01-01.
    pub published_end: i64,
    pub stats: SyncStats,
}

/// Remote to local: decode the store's blocks and attach appointment detail.
#[tracing::instrument(skip_all, fields(pass_id = ctx.pass_id))]
pub fn read_pass<A: Scheduled + Clone>(
    ctx: &SyncContext,
    blocks: &StatusBlocks,
    appointments: Vec<A>,
) -> Result<ReadOutcome<A>> {
    let codec = ctx.codec();
    let free_busy = FreeBusy::from_status_ranges(
        codec.decode_blocks(&blocks.busy)?,
        codec.decode_blocks(&blocks.tentative)?,
        codec.decode_blocks(&blocks.out_of_office)?,
    );

    let appointments_seen = appointments.len();
    let busy_times = merge(&free_busy, appointments);

    let stats = SyncStats {
        pass_id: ctx.pass_id,
        blocks: busy_times.len(),
        appointments_seen,
        appointments_attached: appointments_seen - busy_times.unattached(),
        months_written: 0,
    };
    tracing::debug!(?stats, "read pass complete");

    Ok(ReadOutcome { busy_times, stats })
}

/// Local to remote: condense local busy and tentative time and encode it.
///
/// # Errors
/// `InvalidWindow` when the window ends before it starts.
#[tracing::instrument(skip_all, fields(pass_id = ctx.pass_id))]
pub fn write_pass(
    ctx: &SyncContext,
    window: TimeRange,
    busy: &[TimeRange],
    tentative: &[TimeRange],
) -> Result<WriteOutcome> {
    if window.start > window.end {
        return Err(FreeBusyError::InvalidWindow(window.to_string()));
    }

    let busy = condense(busy);
    let tentative = condense(tentative);

    let codec = ctx.codec();
    let busy_blocks = codec.encode(window.start, window.end, &busy);
    let tentative_blocks = codec.encode(window.start, window.end, &tentative);

    let stats = SyncStats {
        pass_id: ctx.pass_id,
        blocks: busy.len() + tentative.len(),
        months_written: busy_blocks.len() + tentative_blocks.len(),
        ..SyncStats::default()
    };
    tracing::debug!(?stats, "write pass complete");

    Ok(WriteOutcome {
        busy: busy_blocks,
        tentative: tentative_blocks,
        published_start: instant_to_epoch_minutes(window.start),
        published_end: instant_to_epoch_minutes(window.end),
        stats,
    })
}
