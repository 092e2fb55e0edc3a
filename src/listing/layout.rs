//! Column widths shared by every line of one listing.
//!
//! Both widths are computed by a full pre-scan before the first line is
//! written and stay frozen for the rest of the render.

use crate::core::address::Address;
use crate::core::program::{InstructionChain, Program};

/// Frozen column widths of one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Characters in the longest `0x`-prefixed segment end address
    pub longest_address: usize,
    /// Byte size of the longest instruction in any function body
    pub longest_instruction: usize,
}

impl ColumnLayout {
    pub fn compute(program: &dyn Program) -> Self {
        Self {
            longest_address: longest_address(program),
            longest_instruction: longest_instruction(program),
        }
    }

    /// Width of the hex byte column: two digits per byte, single spaces between.
    pub fn hex_width(&self) -> usize {
        (self.longest_instruction * 3).saturating_sub(1)
    }

    /// `<addr>:` right-padded to the address column, followed by `gap`.
    pub fn aligned_address(&self, address: u64, gap: &str) -> String {
        let rendered = Address::new(address).to_hex_prefix_string();
        let pad = self.longest_address.saturating_sub(rendered.len());
        format!("{}:{}{}", rendered, " ".repeat(pad), gap)
    }
}

/// Length of the hex rendering of the largest segment end address.
pub fn longest_address(program: &dyn Program) -> usize {
    program
        .segments()
        .iter()
        .filter_map(|seg| seg.end.get())
        .max()
        .map(|end| Address::new(end).to_hex_prefix_string().len())
        .unwrap_or(0)
}

/// Largest instruction byte size over every function body's chain.
pub fn longest_instruction(program: &dyn Program) -> usize {
    program
        .functions()
        .iter()
        .filter(|f| f.start.is_defined() && f.linkage.has_body())
        .flat_map(|f| InstructionChain::of_function(program, f))
        .map(|insn| insn.size as usize)
        .max()
        .unwrap_or(0)
}
