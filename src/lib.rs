//! Annotated disassembly listings for decompiled binaries.
//!
//! `dsmwriter` renders a program's address space (code and data) into a
//! single `.dsm` text listing. Segment layout, function boundaries, decoded
//! instructions and recovered string objects are supplied by collaborators
//! through the traits in [`core::program`] and [`analysis::memory`]; the
//! [`listing`] module turns them into aligned, annotated text.

/// Core data types
pub mod core;

/// Concrete collaborators: byte images, in-memory program views, loading
pub mod analysis;

/// Disassembly backends
pub mod disasm;

/// The listing generator
pub mod listing;

pub mod error;
pub mod logging;

pub use error::{DsmError, Result};
pub use listing::{DsmWriter, ListingConfig, ListingStats};
