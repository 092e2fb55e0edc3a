//! Code pass: functions, their instructions and the data embedded between them.

use std::io::Write;
use tracing::{debug, trace, warn};

use super::Renderer;
use crate::core::address::Address;
use crate::core::function::{Function, Linkage};
use crate::core::program::InstructionChain;
use crate::core::segment::Segment;
use crate::error::Result;

impl<W: Write> Renderer<'_, W> {
    pub(crate) fn code_pass(&mut self) -> Result<()> {
        self.pass_banner("Code Segment")?;
        let program = self.program;
        for segment in program.segments().iter().filter(|s| s.kind.is_code()) {
            self.code_segment(segment)?;
        }
        Ok(())
    }

    /// Walk one code segment: a function where one starts, embedded data up
    /// to the next function start everywhere else.
    fn code_segment(&mut self, segment: &Segment) -> Result<()> {
        writeln!(self.out, "; section: {}", segment.name)?;
        let Some((start, end)) = segment.bounds() else {
            warn!(section = %segment.name, "code segment without defined bounds skipped");
            return Ok(());
        };
        self.stats.code_segments += 1;
        debug!(section = %segment.name, start = %Address::new(start), end = %Address::new(end), "rendering code segment");

        let mut addr = start;
        while addr < end {
            if let Some(function) = self.functions.at(addr) {
                self.function(function)?;
                // Zero-length and inverted functions still move the cursor.
                addr = function
                    .end
                    .get()
                    .filter(|fend| *fend > addr)
                    .unwrap_or(addr + 1);
                continue;
            }

            let next = self.functions.next_start(addr, end).unwrap_or(end);
            self.embedded_data(addr, next)?;
            addr = next;
        }
        Ok(())
    }

    fn function(&mut self, function: &Function) -> Result<()> {
        if function.linkage == Linkage::Idiom {
            warn!(function = function.display_name(), "instruction-idiom function has an address");
            debug_assert!(false, "instruction-idiom function should not have an address");
        }

        write!(self.out, ";")?;
        if let Some(phrase) = function.linkage.phrase() {
            write!(self.out, " {}", phrase)?;
        }
        writeln!(
            self.out,
            " function: {} at {} -- {}",
            function.display_name(),
            function.start,
            function.end
        )?;
        self.stats.functions += 1;

        if !function.linkage.has_body() {
            return Ok(());
        }
        debug!(function = function.display_name(), "rendering function body");

        let program = self.program;
        let mut chain = InstructionChain::of_function(program, function).peekable();
        while let Some(insn) = chain.next() {
            self.instruction(insn, chain.peek().copied())?;

            let insn_end = insn.end_address();
            match chain.peek().map(|next| next.address) {
                Some(next) if insn_end < next => self.embedded_data(insn_end, next)?,
                Some(_) => {}
                None => {
                    if let Some(fend) = function.end.get().filter(|fend| insn_end < *fend) {
                        // The tail gap runs through the byte at the function end.
                        self.embedded_data(insn_end, fend.saturating_add(1))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// `; data inside code section` annotation plus the dump of `[start, end)`.
    fn embedded_data(&mut self, start: u64, end: u64) -> Result<()> {
        writeln!(
            self.out,
            "; data inside code section at {} -- {}",
            Address::new(start),
            Address::new(end)
        )?;
        self.stats.embedded_ranges += 1;
        trace!(start = %Address::new(start), end = %Address::new(end), "embedded data");
        self.data_range(start, end)
    }
}
