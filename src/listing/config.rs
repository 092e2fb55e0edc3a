//! Configuration for the listing generator.
//!
//! Defaults reproduce the classic `.dsm` layout; the JSON loaders let an
//! embedding tool override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DsmError, Result};

/// Presentation settings for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Bytes per plain data line (default: 16).
    pub bytes_per_line: usize,
    /// Fixed alignment gap between columns (default: three spaces).
    pub column_gap: String,
    /// Separator between the hex byte column and disassembly (default: tab).
    pub mnemonic_separator: String,
    /// Tool banner lines printed at the top of the header.
    pub banner: Vec<String>,
    /// Emit generation date and copyright year (default: true).
    pub include_timestamp: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: 16,
            column_gap: "   ".to_string(),
            mnemonic_separator: "\t".to_string(),
            banner: vec!["This file was generated by dsmwriter".to_string()],
            include_timestamp: true,
        }
    }
}

impl ListingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ListingConfig =
            serde_json::from_str(json).map_err(|e| DsmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bytes_per_line == 0 {
            return Err(DsmError::Config(
                "bytes_per_line must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Index of the byte after which a data line gets an extra space.
    pub(crate) fn halving_index(&self) -> Option<usize> {
        (self.bytes_per_line >= 2).then(|| self.bytes_per_line / 2 - 1)
    }
}
