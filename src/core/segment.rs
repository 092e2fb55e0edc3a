//! Segment type for the listing's address space.
//!
//! Segments come from the binary's section table. The renderer only cares
//! about their bounds and whether they hold code, data, or both.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::address::Address;

/// Section classification of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Executable code
    Code,
    /// Writable data
    Data,
    /// Read-only data
    ConstData,
    /// Mixed code and data
    CodeAndData,
    /// Anything else (debug info, notes, ...)
    Other,
}

impl SegmentKind {
    /// Rendered by the code pass
    pub fn is_code(&self) -> bool {
        matches!(self, SegmentKind::Code | SegmentKind::CodeAndData)
    }

    /// Rendered by the data pass
    pub fn is_data(&self) -> bool {
        matches!(self, SegmentKind::Data | SegmentKind::ConstData)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Code => write!(f, "code"),
            SegmentKind::Data => write!(f, "data"),
            SegmentKind::ConstData => write!(f, "const-data"),
            SegmentKind::CodeAndData => write!(f, "code+data"),
            SegmentKind::Other => write!(f, "other"),
        }
    }
}

/// A contiguous address range `[start, end)` from the section table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub start: Address,
    pub end: Address,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn new(name: impl Into<String>, start: u64, end: u64, kind: SegmentKind) -> Self {
        Self {
            name: name.into(),
            start: Address::new(start),
            end: Address::new(end),
            kind,
        }
    }

    /// Numeric bounds, when both ends are defined.
    pub fn bounds(&self) -> Option<(u64, u64)> {
        Some((self.start.get()?, self.end.get()?))
    }

    /// Size in bytes (zero when undefined or inverted)
    pub fn size(&self) -> u64 {
        self.end.offset_from(self.start).unwrap_or(0)
    }

    pub fn contains(&self, address: u64) -> bool {
        self.bounds()
            .is_some_and(|(start, end)| address >= start && address < end)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment '{}' ({}, {} -- {})",
            self.name, self.kind, self.start, self.end
        )
    }
}
