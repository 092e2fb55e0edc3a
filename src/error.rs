//! Error types for the dsmwriter crate.
//!
//! Rendering itself only fails when the output sink fails; everything else
//! (unreadable bytes, unresolved targets) degrades in the output instead.

use thiserror::Error;

use crate::core::disassembler::DisassemblerError;

/// Main error type for dsmwriter operations.
#[derive(Debug, Error)]
pub enum DsmError {
    /// Output sink or file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be parsed as an object file
    #[error("Invalid binary format: {0}")]
    InvalidFormat(String),

    /// Architecture not supported by any decoder backend
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// Listing configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Decoder errors surfaced outside the sweep loop
    #[error("Disassembly error: {0}")]
    Disassembly(#[from] DisassemblerError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for dsmwriter operations
pub type Result<T> = std::result::Result<T, DsmError>;
