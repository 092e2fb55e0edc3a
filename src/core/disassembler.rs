//! Disassembler trait, architecture identity and decoder error types.
//!
//! This module defines the Disassembler trait that provides a common interface
//! for different decoder backends (iced-x86, Capstone). The listing itself
//! never decodes; it only asks the architecture which annotation rules apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::instruction::Instruction;

/// Errors that can occur during disassembly operations
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DisassemblerError {
    /// Invalid instruction bytes
    #[error("invalid instruction")]
    InvalidInstruction,
    /// Insufficient bytes for complete instruction
    #[error("insufficient bytes")]
    InsufficientBytes,
    /// Unsupported architecture for the selected backend
    #[error("unsupported architecture")]
    UnsupportedArchitecture,
    /// Internal disassembler error with message
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type for disassembly operations
pub type DisassemblerResult<T> = Result<T, DisassemblerError>;

/// Byte order of the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Architecture types known to the listing and its decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// x86 (32-bit)
    X86,
    /// x86-64 (64-bit)
    X86_64,
    /// ARM (32-bit)
    ARM,
    /// ARM64/AArch64 (64-bit)
    ARM64,
    /// MIPS (32-bit)
    MIPS,
    /// MIPS64 (64-bit)
    MIPS64,
    /// PIC32 (MIPS32 core)
    PIC32,
    /// PowerPC (32-bit)
    PPC,
    /// PowerPC64 (64-bit)
    PPC64,
    /// RISC-V (32-bit)
    RISCV,
    /// RISC-V (64-bit)
    RISCV64,
    /// Unknown/unsupported architecture
    Unknown,
}

impl Architecture {
    pub fn is_x86(&self) -> bool {
        matches!(self, Architecture::X86 | Architecture::X86_64)
    }

    pub fn is_mips_or_pic32(&self) -> bool {
        matches!(
            self,
            Architecture::MIPS | Architecture::MIPS64 | Architecture::PIC32
        )
    }

    /// Annotation rules that depend on the architecture.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            delay_slot: self.is_mips_or_pic32(),
            x86_operands: self.is_x86(),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::ARM => write!(f, "arm"),
            Architecture::ARM64 => write!(f, "arm64"),
            Architecture::MIPS => write!(f, "mips"),
            Architecture::MIPS64 => write!(f, "mips64"),
            Architecture::PIC32 => write!(f, "pic32"),
            Architecture::PPC => write!(f, "ppc"),
            Architecture::PPC64 => write!(f, "ppc64"),
            Architecture::RISCV => write!(f, "riscv"),
            Architecture::RISCV64 => write!(f, "riscv64"),
            Architecture::Unknown => write!(f, "unknown"),
        }
    }
}

/// Architecture-conditional behaviour, resolved once per render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Control transfers are attributed to the delay-slot successor
    pub delay_slot: bool,
    /// Operands carry x86 immediate/memory detail usable for literal comments
    pub x86_operands: bool,
}

/// Core disassembler trait that provides a common interface for instruction decoding
pub trait Disassembler {
    /// Decode a single instruction located at `address`.
    ///
    /// `bytes` starts at `address` and may extend past the instruction.
    fn decode(&self, address: u64, bytes: &[u8]) -> DisassemblerResult<Instruction>;

    /// Get the maximum instruction length for this architecture in bytes
    fn max_instruction_length(&self) -> usize;

    /// Get the architecture this disassembler supports
    fn architecture(&self) -> Architecture;

    /// Get the endianness this disassembler uses
    fn endianness(&self) -> Endianness;

    /// Get a human-readable name for this disassembler
    fn name(&self) -> &str {
        "Generic Disassembler"
    }
}
