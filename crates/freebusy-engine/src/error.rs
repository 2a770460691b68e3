//! Error types for freebusy-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreeBusyError {
    #[error("Invalid month block payload: {0}")]
    InvalidBlob(String),

    #[error("Month block payload is {0} bytes, expected a multiple of 4")]
    BlobLength(usize),

    #[error("Invalid month index: {0}")]
    InvalidMonthIndex(i32),

    #[error("Invalid sync window: {0}")]
    InvalidWindow(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FreeBusyError>;
