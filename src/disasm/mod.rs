//! Disassembly engines and registry.
//!
//! Always-on adapters:
//! - iced-x86 for x86/x64
//! - capstone for ARM/AArch64, MIPS/PIC32, PPC, RISC-V

pub mod capstone;
pub mod iced;
pub mod registry;
