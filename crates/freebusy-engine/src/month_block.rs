//! Month-chunked free/busy blobs, the legacy public-folder wire format.
//!
//! Ranges are split so that no piece crosses a calendar-month boundary, then
//! each month's pieces are packed into one base64 blob tagged with a
//! [`MonthIndex`]. Two payload layouts exist:
//!
//! - [`BlobFormat::MinuteBitmap`]: one bit per minute of the month, minute 0
//!   in the least significant bit of byte 0. Overlapping or touching pieces
//!   merge and zero-length pieces vanish.
//! - [`BlobFormat::RangePairs`]: each piece as two little-endian `u16` minute
//!   offsets from the start of the month (start, end). Lossless.
//!
//! A piece that would end at midnight on the first day of the next month is
//! clipped to 23:59 on the last day of its own month, as the legacy store
//! writes it.

use std::collections::BTreeMap;

use base64::prelude::*;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FreeBusyError, Result};
use crate::range::TimeRange;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Calendar month packed as `year * 16 + month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthIndex(i32);

impl MonthIndex {
    /// The month containing `t`.
    pub fn of(t: DateTime<Utc>) -> Self {
        Self(t.year() * 16 + t.month() as i32)
    }

    /// Accepts any raw value whose low nibble is a month number.
    pub fn from_raw(value: i32) -> Result<Self> {
        if (1..=12).contains(&(value & 15)) {
            Ok(Self(value))
        } else {
            Err(FreeBusyError::InvalidMonthIndex(value))
        }
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0 >> 4
    }

    pub fn month(self) -> u32 {
        (self.0 & 15) as u32
    }

    /// Midnight UTC on the first day of the month.
    pub fn start(self) -> Result<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
            .ok_or(FreeBusyError::InvalidMonthIndex(self.0))
    }
}

impl std::fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02} ({})", self.year(), self.month(), self.0)
    }
}

/// Payload layout of a month blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlobFormat {
    #[default]
    MinuteBitmap,
    RangePairs,
}

/// One month of encoded free/busy data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBlock {
    pub month: MonthIndex,
    pub blob: String,
}

/// Midnight on the first day of the month containing `t`.
pub fn start_of_month(t: DateTime<Utc>) -> DateTime<Utc> {
    let date = t.date_naive();
    (date - Duration::days(i64::from(date.day0())))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Midnight on the first day of the month after the one containing `t`, or
/// `None` in the last month `DateTime<Utc>` can represent.
pub fn start_of_next_month(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // Day 1 plus 31 days always lands early in the following month.
    start_of_month(t)
        .checked_add_signed(Duration::days(31))
        .map(start_of_month)
}

fn days_in_month(year: i32, month: u32) -> i64 {
    match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn minutes_in_month(month_start: DateTime<Utc>) -> usize {
    (days_in_month(month_start.year(), month_start.month()) * MINUTES_PER_DAY) as usize
}

/// `month_start` plus `minutes`, failing with `InvalidMonthIndex` when the
/// result is not representable.
fn minute_of(month: i32, month_start: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes)
        .and_then(|d| month_start.checked_add_signed(d))
        .ok_or(FreeBusyError::InvalidMonthIndex(month))
}

/// Split `range` into one piece per calendar month it touches.
///
/// Every piece except the last ends at 23:59 on its month's last day, and so
/// does the last one when `range` ends exactly at a month boundary. A piece
/// that starts after 23:59 ends at its own start. Inverted ranges yield
/// nothing.
pub fn split_by_month(range: &TimeRange) -> Vec<TimeRange> {
    let mut parts = Vec::new();
    if range.start > range.end {
        return parts;
    }

    let mut cursor = range.start;
    loop {
        let Some(next) = start_of_next_month(cursor).filter(|next| range.end >= *next) else {
            parts.push(TimeRange::new(cursor, range.end));
            break;
        };
        // A piece starting inside the last minute ends where it starts.
        parts.push(TimeRange::new(cursor, (next - Duration::minutes(1)).max(cursor)));
        if range.end == next {
            break;
        }
        cursor = next;
    }

    parts
}

/// Encode `ranges` into month blobs, ascending by month.
///
/// Ranges are clipped to `[range_start, range_end)`; those entirely outside
/// the window or inverted are skipped. Months without any piece produce no
/// block.
pub fn encode(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    ranges: &[TimeRange],
    format: BlobFormat,
) -> Vec<MonthBlock> {
    let mut months: BTreeMap<MonthIndex, Vec<TimeRange>> = BTreeMap::new();

    for range in ranges {
        let outside = range.start >= range_end
            || range.end < range_start
            || (range.end == range_start && !range.is_empty());
        if range.start > range.end || outside {
            continue;
        }

        let clipped = TimeRange::new(range.start.max(range_start), range.end.min(range_end));
        for part in split_by_month(&clipped) {
            months.entry(MonthIndex::of(part.start)).or_default().push(part);
        }
    }

    months
        .into_iter()
        .map(|(month, parts)| {
            let month_start = start_of_month(parts[0].start);
            let bytes = match format {
                BlobFormat::MinuteBitmap => pack_bitmap(month_start, &parts),
                BlobFormat::RangePairs => pack_pairs(month_start, &parts),
            };
            MonthBlock {
                month,
                blob: BASE64_STANDARD.encode(bytes),
            }
        })
        .collect()
}

/// Decode one month blob back into ranges.
///
/// # Errors
/// `InvalidMonthIndex` when `month` is not a calendar month or its ranges
/// fall outside the representable time range, `InvalidBlob`
/// when `blob` is not base64, and `BlobLength` for a range-pair payload whose
/// size is not a multiple of four bytes.
pub fn decode(month: i32, blob: &str, format: BlobFormat) -> Result<Vec<TimeRange>> {
    let month_start = MonthIndex::from_raw(month)?.start()?;
    let bytes = BASE64_STANDARD
        .decode(blob.trim())
        .map_err(|e| FreeBusyError::InvalidBlob(e.to_string()))?;

    match format {
        BlobFormat::MinuteBitmap => unpack_bitmap(month, month_start, &bytes),
        BlobFormat::RangePairs => unpack_pairs(month, month_start, &bytes),
    }
}

/// Decode every block and concatenate the ranges in block order.
pub fn decode_blocks(blocks: &[MonthBlock], format: BlobFormat) -> Result<Vec<TimeRange>> {
    let mut ranges = Vec::new();
    for block in blocks {
        ranges.extend(decode(block.month.value(), &block.blob, format)?);
    }
    Ok(ranges)
}

/// Split blocks into the parallel month and blob lists the store keeps.
pub fn unzip_blocks(blocks: &[MonthBlock]) -> (Vec<i32>, Vec<String>) {
    blocks
        .iter()
        .map(|b| (b.month.value(), b.blob.clone()))
        .unzip()
}

fn offset_minutes(month_start: DateTime<Utc>, t: DateTime<Utc>) -> i64 {
    (t - month_start).num_minutes()
}

fn pack_bitmap(month_start: DateTime<Utc>, parts: &[TimeRange]) -> Vec<u8> {
    let minutes = minutes_in_month(month_start);
    let mut bits = vec![0u8; minutes.div_ceil(8)];

    for part in parts {
        let first = offset_minutes(month_start, part.start).clamp(0, minutes as i64) as usize;
        let end = offset_minutes(month_start, part.end).clamp(0, minutes as i64) as usize;
        for minute in first..end {
            bits[minute / 8] |= 1 << (minute % 8);
        }
    }

    bits
}

fn unpack_bitmap(month: i32, month_start: DateTime<Utc>, bytes: &[u8]) -> Result<Vec<TimeRange>> {
    let limit = minutes_in_month(month_start).min(bytes.len() * 8);
    let at = |minute: usize| minute_of(month, month_start, minute as i64);

    let mut ranges = Vec::new();
    let mut run: Option<usize> = None;
    for minute in 0..limit {
        let set = (bytes[minute / 8] >> (minute % 8)) & 1 == 1;
        match (set, run) {
            (true, None) => run = Some(minute),
            (false, Some(first)) => {
                ranges.push(TimeRange::new(at(first)?, at(minute)?));
                run = None;
            }
            _ => {}
        }
    }
    if let Some(first) = run {
        ranges.push(TimeRange::new(at(first)?, at(limit)?));
    }

    Ok(ranges)
}

fn pack_pairs(month_start: DateTime<Utc>, parts: &[TimeRange]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(parts.len() * 4);
    for part in parts {
        for t in [part.start, part.end] {
            let offset = offset_minutes(month_start, t).clamp(0, i64::from(u16::MAX)) as u16;
            bytes.extend_from_slice(&offset.to_le_bytes());
        }
    }
    bytes
}

fn unpack_pairs(month: i32, month_start: DateTime<Utc>, bytes: &[u8]) -> Result<Vec<TimeRange>> {
    if bytes.len() % 4 != 0 {
        return Err(FreeBusyError::BlobLength(bytes.len()));
    }

    let at = |lo: u8, hi: u8| {
        minute_of(month, month_start, i64::from(u16::from_le_bytes([lo, hi])))
    };
    bytes
        .chunks_exact(4)
        .map(|c| Ok(TimeRange::new(at(c[0], c[1])?, at(c[2], c[3])?)))
        .collect()
}

/// A configured blob format bundled with both codec directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthBlockCodec {
    pub format: BlobFormat,
}

impl MonthBlockCodec {
    pub fn new(format: BlobFormat) -> Self {
        Self { format }
    }

    pub fn encode(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        ranges: &[TimeRange],
    ) -> Vec<MonthBlock> {
        encode(range_start, range_end, ranges, self.format)
    }

    pub fn decode(&self, month: i32, blob: &str) -> Result<Vec<TimeRange>> {
        decode(month, blob, self.format)
    }

    pub fn decode_blocks(&self, blocks: &[MonthBlock]) -> Result<Vec<TimeRange>> {
        decode_blocks(blocks, self.format)
    }
}
