//! Collaborator interfaces consumed by the listing generator.
//!
//! The listing never decodes, never infers function boundaries and never
//! recovers types. It reads those facts through the `Program` and
//! `TypeSizes` traits defined here; raw bytes come through
//! [`crate::analysis::memory::MemoryView`].

use crate::core::disassembler::Architecture;
use crate::core::function::Function;
use crate::core::global::{DataArray, GlobalObject};
use crate::core::instruction::Instruction;
use crate::core::segment::Segment;

/// Read-only view of a decompiled program.
///
/// All queries are pure for the duration of one render.
pub trait Program {
    /// Target architecture; `None` means no architecture was recognized.
    fn architecture(&self) -> Option<Architecture>;

    /// Architecture name printed in the listing header
    fn architecture_name(&self) -> String {
        self.architecture()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Segments in load order
    fn segments(&self) -> &[Segment];

    fn functions(&self) -> &[Function];

    /// Decoded instruction starting exactly at `address`
    fn instruction_at(&self, address: u64) -> Option<&Instruction>;

    /// Chain successor of `insn` within its function, which may start past
    /// `insn.end_address()`.
    fn next_instruction(&self, insn: &Instruction) -> Option<&Instruction>;

    /// Chain successor of `insn` while walking `function`.
    ///
    /// Differs from [`Program::next_instruction`] when functions nest: the
    /// walk of an outer function continues past the end of an inner one.
    fn next_instruction_in(&self, _function: &Function, insn: &Instruction) -> Option<&Instruction> {
        self.next_instruction(insn)
    }

    /// First instruction of a function body
    fn first_instruction(&self, function: &Function) -> Option<&Instruction> {
        self.instruction_at(function.start.get()?)
    }

    /// Function whose body owns the instruction at `address`
    fn function_containing(&self, address: u64) -> Option<&Function>;

    /// Recovered global object anchored at `address`
    fn global_object(&self, address: u64) -> Option<&GlobalObject>;

    /// Nearest object in `[from, end)` with an array initializer.
    fn next_array_object(&self, from: u64, end: u64) -> Option<&GlobalObject> {
        (from..end).find_map(|address| {
            self.global_object(address)
                .filter(|obj| obj.data_array().is_some())
        })
    }
}

/// ABI size oracle for recovered types.
pub trait TypeSizes {
    /// Size in bytes of the whole array type
    fn array_byte_size(&self, array: &DataArray) -> u64;

    /// Size in bits of one array element
    fn element_bit_size(&self, array: &DataArray) -> u32;
}

/// Sizes derived from the element width alone, with no padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalTypeSizes;

impl TypeSizes for NaturalTypeSizes {
    fn array_byte_size(&self, array: &DataArray) -> u64 {
        let element_bytes = (array.element_bits as u64).div_ceil(8);
        element_bytes * array.len() as u64
    }

    fn element_bit_size(&self, array: &DataArray) -> u32 {
        array.element_bits
    }
}

/// Forward-only walk over an instruction chain.
///
/// Restart it by building a new chain from the same first instruction.
pub struct InstructionChain<'a> {
    program: &'a dyn Program,
    function: Option<&'a Function>,
    next: Option<&'a Instruction>,
}

impl<'a> InstructionChain<'a> {
    pub fn new(program: &'a dyn Program, first: Option<&'a Instruction>) -> Self {
        Self {
            program,
            function: None,
            next: first,
        }
    }

    /// Chain of a function body, starting at its first instruction and
    /// bounded by that function rather than by whichever function owns
    /// each instruction.
    pub fn of_function(program: &'a dyn Program, function: &'a Function) -> Self {
        Self {
            program,
            function: Some(function),
            next: program.first_instruction(function),
        }
    }
}

impl<'a> Iterator for InstructionChain<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        // Addresses must strictly increase, otherwise the walk could cycle.
        let successor = match self.function {
            Some(function) => self.program.next_instruction_in(function, current),
            None => self.program.next_instruction(current),
        };
        self.next = successor.filter(|next| next.address > current.address);
        Some(current)
    }
}
