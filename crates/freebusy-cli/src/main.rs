//! `fbsync` CLI — work with legacy free/busy rasters and month blocks from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Decode a 15-minute raster into busy/tentative/out-of-office ranges
//! fbsync raster-decode --start 2008-05-01T10:00:00Z 40312
//!
//! # Encode a FreeBusy JSON document back into a raster of 8 slots
//! fbsync raster-encode --start 2008-05-01T10:00:00Z --slots 8 -i freebusy.json
//!
//! # Pack time ranges into month blocks, and unpack them again
//! fbsync encode --start 2008-05-01T00:00:00Z --end 2008-07-01T00:00:00Z -i ranges.json
//! fbsync decode --format pairs -i blocks.json
//!
//! # Attach appointments to free/busy blocks
//! fbsync merge --freebusy freebusy.json --appointments appointments.json
//!
//! # Convert between instants and minutes since 1601-01-01
//! fbsync epoch 2008-05-01T00:00:00Z
//! fbsync epoch --minutes 214234560
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use freebusy_engine::month_block::{self, MonthBlock};
use freebusy_engine::{
    instant_to_epoch_minutes, try_epoch_minutes_to_instant, Appointment, BlobFormat, FreeBusy,
    SyncConfig, TimeRange,
};

#[derive(Parser)]
#[command(
    name = "fbsync",
    version,
    about = "Legacy free/busy raster and month-block tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML sync configuration; flags on a subcommand override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a status raster into FreeBusy JSON
    RasterDecode {
        /// Instant of the first slot (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Slot length in minutes
        #[arg(long)]
        slot_minutes: Option<u32>,
        /// Raster string (reads from input if omitted)
        raster: Option<String>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Encode FreeBusy JSON into a status raster
    RasterEncode {
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        slot_minutes: Option<u32>,
        /// Number of slots to emit
        #[arg(long)]
        slots: usize,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Encode a JSON array of time ranges into month blocks
    Encode {
        /// Window start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Window end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Decode a JSON array of month blocks into time ranges
    Decode {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Attach appointments to the blocks of a FreeBusy document
    Merge {
        /// FreeBusy JSON file
        #[arg(long)]
        freebusy: PathBuf,
        /// JSON array of appointments
        #[arg(long)]
        appointments: PathBuf,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert an instant to minutes since 1601-01-01 UTC, or back
    Epoch {
        #[arg(required_unless_present = "minutes")]
        instant: Option<DateTime<Utc>>,
        #[arg(long, conflicts_with = "instant")]
        minutes: Option<i64>,
    },
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// One bit per minute of the month
    Bitmap,
    /// Little-endian u16 start/end minute pairs
    Pairs,
}

impl From<FormatArg> for BlobFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bitmap => BlobFormat::MinuteBitmap,
            FormatArg::Pairs => BlobFormat::RangePairs,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SyncConfig::default(),
    };

    match cli.command {
        Commands::RasterDecode {
            start,
            slot_minutes,
            raster,
            io,
        } => {
            let raster = match raster {
                Some(raster) => raster,
                None => read_input(io.input.as_deref())?.trim().to_string(),
            };
            let slot_minutes = slot_minutes_or(&config, slot_minutes)?;

            let mut fb = FreeBusy::new();
            freebusy_engine::decode_raster(start, slot_minutes, &raster, &mut fb);
            write_json(io.output.as_deref(), &fb)?;
        }
        Commands::RasterEncode {
            start,
            slot_minutes,
            slots,
            io,
        } => {
            let json = read_input(io.input.as_deref())?;
            let fb: FreeBusy =
                serde_json::from_str(&json).context("Failed to parse FreeBusy JSON")?;
            let slot_minutes = slot_minutes_or(&config, slot_minutes)?;

            let raster = freebusy_engine::encode_raster(start, slot_minutes, slots, &fb);
            write_output(io.output.as_deref(), &format!("{raster}\n"))?;
        }
        Commands::Encode {
            start,
            end,
            format,
            io,
        } => {
            if start > end {
                anyhow::bail!("Window end {end} is before its start {start}");
            }
            let json = read_input(io.input.as_deref())?;
            let ranges: Vec<TimeRange> =
                serde_json::from_str(&json).context("Failed to parse time range array")?;

            let format = format.map_or(config.blob_format, BlobFormat::from);
            let blocks = month_block::encode(start, end, &ranges, format);
            write_json(io.output.as_deref(), &blocks)?;
        }
        Commands::Decode { format, io } => {
            let json = read_input(io.input.as_deref())?;
            let blocks: Vec<MonthBlock> =
                serde_json::from_str(&json).context("Failed to parse month block array")?;

            let format = format.map_or(config.blob_format, BlobFormat::from);
            let ranges = month_block::decode_blocks(&blocks, format)
                .context("Failed to decode month blocks")?;
            write_json(io.output.as_deref(), &ranges)?;
        }
        Commands::Merge {
            freebusy,
            appointments,
            output,
        } => {
            let fb: FreeBusy = read_json_file(&freebusy)?;
            let appointments: Vec<Appointment> = read_json_file(&appointments)?;

            let busy_times = freebusy_engine::merge(&fb, appointments);
            write_json(output.as_deref(), &busy_times)?;
        }
        Commands::Epoch { instant, minutes } => match (instant, minutes) {
            (_, Some(minutes)) => {
                let instant = try_epoch_minutes_to_instant(minutes).with_context(|| {
                    format!("{minutes} minutes since 1601-01-01 is out of range")
                })?;
                println!("{}", instant.to_rfc3339());
            }
            (Some(instant), None) => println!("{}", instant_to_epoch_minutes(instant)),
            (None, None) => anyhow::bail!("Either an instant or --minutes is required"),
        },
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `-v`.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn slot_minutes_or(config: &SyncConfig, flag: Option<u32>) -> Result<u32> {
    let minutes = flag.unwrap_or(config.slot_minutes);
    if minutes == 0 {
        anyhow::bail!("Slot length must be at least one minute");
    }
    Ok(minutes)
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut pretty = serde_json::to_string_pretty(value)?;
    pretty.push('\n');
    write_output(path, &pretty)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
