//! Sync configuration, read from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! slot_minutes = 15
//! blob_format = "minute-bitmap"   # or "range-pairs"
//! threading = "single"            # or "multi"
//! window_days = 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FreeBusyError, Result};
use crate::month_block::BlobFormat;

/// How the scheduling harness runs passes. The engine itself ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Threading {
    #[default]
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Raster slot length in minutes.
    pub slot_minutes: u32,
    pub blob_format: BlobFormat,
    pub threading: Threading,
    /// Length of the sync window in days.
    pub window_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 15,
            blob_format: BlobFormat::default(),
            threading: Threading::default(),
            window_days: 30,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| FreeBusyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading sync config");
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 {
            return Err(FreeBusyError::Config("slot_minutes must be positive".into()));
        }
        if self.window_days == 0 {
            return Err(FreeBusyError::Config("window_days must be positive".into()));
        }
        Ok(())
    }
}
