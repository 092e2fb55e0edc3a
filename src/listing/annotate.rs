//! One instruction line: address, raw bytes, annotated disassembly.

use std::io::Write;

use super::text::normalize_disassembly;
use super::Renderer;
use crate::core::instruction::{BranchTargets, ControlFlow, Instruction};
use crate::error::Result;

impl<W: Write> Renderer<'_, W> {
    /// `successor` is the next instruction of the chain being walked.
    pub(crate) fn instruction(
        &mut self,
        insn: &Instruction,
        successor: Option<&Instruction>,
    ) -> Result<()> {
        let line = format!(
            "{}{}{}{}{}",
            self.address_column(insn.address),
            self.hex_column(insn),
            self.config.column_gap,
            self.config.mnemonic_separator,
            self.annotated_text(insn, successor)
        );
        writeln!(self.out, "{}", line)?;
        self.stats.instructions += 1;
        Ok(())
    }

    /// Raw bytes padded to the frozen hex column width.
    fn hex_column(&self, insn: &Instruction) -> String {
        let hex = self
            .memory
            .read_bytes(insn.address, insn.size as usize)
            .into_iter()
            .map(|byte| match byte {
                Ok(b) => format!("{:02x}", b),
                Err(_) => "??".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{:<width$}", hex, width = self.layout.hex_width())
    }

    /// Disassembly text with call/branch annotations and the literal comment.
    fn annotated_text(&self, insn: &Instruction, successor: Option<&Instruction>) -> String {
        // Delay slots: the transfer is attributed to the following slot.
        let inspected = match successor {
            Some(next) if self.caps.delay_slot => next,
            _ => insn,
        };

        let mut text = insn.text.clone();
        match &inspected.flow {
            ControlFlow::Call { callee: Some(callee) } => {
                if let Some(function) = self.functions.at(*callee) {
                    text.push_str(&format!(" <{}>", function.display_name()));
                }
            }
            ControlFlow::Branch(targets) => {
                if let Some(annotation) = self.branch_annotation(inspected, successor, targets) {
                    text.push_str(&annotation);
                }
            }
            _ => {}
        }

        let comment = if self.caps.x86_operands {
            self.literal_comment(insn)
        } else {
            None
        };

        let mut text = normalize_disassembly(&text);
        if let Some(comment) = comment {
            text.push_str(" ; ");
            text.push_str(&comment);
        }
        text
    }

    /// `<function+offset>` for a branch target, unless the branch only
    /// restates fallthrough or points back at itself.
    fn branch_annotation(
        &self,
        inspected: &Instruction,
        successor: Option<&Instruction>,
        targets: &BranchTargets,
    ) -> Option<String> {
        let program = self.program;
        if targets.conditional {
            let false_target = targets.fallthrough.and_then(|a| program.instruction_at(a));
            if false_target.is_some_and(|t| t.address == inspected.address) {
                return None;
            }
        }

        let taken = program.instruction_at(targets.taken?)?;
        if !targets.conditional && successor.is_some_and(|s| s.address == taken.address) {
            return None;
        }
        if taken.address == inspected.address {
            return None;
        }

        let owner = program.function_containing(taken.address)?;
        let start = owner.start.get()?;
        Some(format!(
            " <{}+{:#x}>",
            owner.display_name(),
            taken.address.wrapping_sub(start)
        ))
    }

    /// String value of the first operand that addresses a character array.
    ///
    /// Arrays that do not hold characters yield no value and are skipped.
    fn literal_comment(&self, insn: &Instruction) -> Option<String> {
        let program = self.program;
        insn.operands
            .iter()
            .filter_map(|op| op.literal_address())
            .filter_map(|address| program.global_object(address))
            .map(|object| self.object_string(object))
            .find(|value| !value.is_empty())
    }
}
