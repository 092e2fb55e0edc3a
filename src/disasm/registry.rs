use crate::core::disassembler::{
    Architecture, Disassembler, DisassemblerError, DisassemblerResult, Endianness,
};
use crate::core::instruction::Instruction;

use super::capstone::CapstoneDisassembler;
use super::iced::IcedDisassembler;

pub enum Backend {
    Iced(IcedDisassembler),
    Cap(CapstoneDisassembler),
}

impl Disassembler for Backend {
    fn decode(&self, address: u64, bytes: &[u8]) -> DisassemblerResult<Instruction> {
        match self {
            Backend::Iced(d) => d.decode(address, bytes),
            Backend::Cap(d) => d.decode(address, bytes),
        }
    }

    fn max_instruction_length(&self) -> usize {
        match self {
            Backend::Iced(d) => d.max_instruction_length(),
            Backend::Cap(d) => d.max_instruction_length(),
        }
    }

    fn architecture(&self) -> Architecture {
        match self {
            Backend::Iced(d) => d.architecture(),
            Backend::Cap(d) => d.architecture(),
        }
    }

    fn endianness(&self) -> Endianness {
        match self {
            Backend::Iced(d) => d.endianness(),
            Backend::Cap(d) => d.endianness(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Backend::Iced(d) => d.name(),
            Backend::Cap(d) => d.name(),
        }
    }
}

/// Select a disassembler backend for the given architecture.
pub fn for_arch(arch: Architecture, endianness: Endianness) -> Option<Backend> {
    match arch {
        Architecture::X86 | Architecture::X86_64 => {
            Some(Backend::Iced(IcedDisassembler::new(arch, endianness)))
        }
        Architecture::Unknown => None,
        _ => CapstoneDisassembler::new(arch, endianness).map(Backend::Cap),
    }
}

/// Preferred backend kind for explicit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Iced,
    Capstone,
}

/// Explicit backend selector. Returns an error if the backend cannot support the arch.
pub fn for_arch_with(
    arch: Architecture,
    endianness: Endianness,
    prefer: Option<BackendKind>,
) -> Result<Backend, DisassemblerError> {
    match prefer {
        Some(BackendKind::Iced) if arch.is_x86() => {
            Ok(Backend::Iced(IcedDisassembler::new(arch, endianness)))
        }
        Some(BackendKind::Iced) => Err(DisassemblerError::UnsupportedArchitecture),
        Some(BackendKind::Capstone) => CapstoneDisassembler::new(arch, endianness)
            .map(Backend::Cap)
            .ok_or(DisassemblerError::UnsupportedArchitecture),
        None => for_arch(arch, endianness).ok_or(DisassemblerError::UnsupportedArchitecture),
    }
}
