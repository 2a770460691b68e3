//! # freebusy-engine
//!
//! Reconciles calendar availability between two calendar stores that speak
//! the legacy free/busy formats.
//!
//! Pure, synchronous data transformation: no network I/O, no timezone name
//! resolution and no global state. A scheduling harness calls into it once
//! per sync pass.
//!
//! ## Modules
//!
//! - [`range`] — `TimeRange` and the `Interval` abstraction
//! - [`interval_tree`] — Unbalanced augmented interval tree with overlap/exact/containment queries
//! - [`freebusy`] — Per-user `FreeBusy` model, `BusyStatus`, range condensing
//! - [`raster`] — One-character-per-slot status raster ↔ `FreeBusy`
//! - [`month_block`] — Month-chunked base64 blobs ↔ time ranges
//! - [`epoch`] — Minutes since 1601-01-01 UTC
//! - [`reconcile`] — Attach appointments to free/busy blocks
//! - [`sync`] — Read and write passes driven by an explicit context
//! - [`config`] — TOML sync configuration
//! - [`error`] — Error types

pub mod config;
pub mod epoch;
pub mod error;
pub mod freebusy;
pub mod interval_tree;
pub mod month_block;
pub mod range;
pub mod raster;
pub mod reconcile;
pub mod sync;

pub use config::SyncConfig;
pub use epoch::{epoch_minutes_to_instant, instant_to_epoch_minutes, try_epoch_minutes_to_instant};
pub use error::FreeBusyError;
pub use freebusy::{condense, BusyStatus, FreeBusy};
pub use interval_tree::{IntervalTree, MatchMode};
pub use month_block::{BlobFormat, MonthBlock, MonthBlockCodec, MonthIndex};
pub use range::{Interval, TimeRange};
pub use raster::{decode_raster, encode_raster};
pub use reconcile::{merge, Appointment, BusyTimes, FreeBusyTimeBlock, Scheduled};
pub use sync::{read_pass, write_pass, StatusBlocks, SyncContext, SyncStats};
