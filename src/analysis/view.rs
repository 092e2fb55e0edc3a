//! ProgramView: in-memory program model implementing [`Program`].
//!
//! Aggregates segments, functions, decoded instructions and recovered
//! global objects in ordered indexes. It is filled either by hand (tests,
//! embedders that already have analysis results) or by
//! [`crate::analysis::decode::decode_program`]. It performs no I/O itself.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::core::disassembler::Architecture;
use crate::core::function::Function;
use crate::core::global::GlobalObject;
use crate::core::instruction::Instruction;
use crate::core::program::Program;
use crate::core::segment::Segment;

/// Analysis-time container over a decompiled program.
#[derive(Debug, Clone, Default)]
pub struct ProgramView {
    architecture: Option<Architecture>,
    architecture_name: Option<String>,
    segments: Vec<Segment>,
    functions: Vec<Function>,
    /// start address -> index into `functions`, defined starts only
    function_starts: BTreeMap<u64, usize>,
    instructions: BTreeMap<u64, Instruction>,
    globals: BTreeMap<u64, GlobalObject>,
}

impl ProgramView {
    /// Create an empty view for `architecture`.
    pub fn new(architecture: Architecture) -> Self {
        Self {
            architecture: Some(architecture),
            ..Self::default()
        }
    }

    /// Create a view with no recognized architecture.
    pub fn without_architecture() -> Self {
        Self::default()
    }

    /// Override the name printed in the listing header.
    pub fn set_architecture_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.architecture_name = Some(name.into());
        self
    }

    /// Segments keep insertion order.
    pub fn add_segment(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    pub fn add_function(&mut self, function: Function) -> &mut Self {
        if let Some(start) = function.start.get() {
            self.function_starts.insert(start, self.functions.len());
        }
        self.functions.push(function);
        self
    }

    /// Instructions are keyed by address; a later insert replaces an earlier one.
    pub fn add_instruction(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.insert(instruction.address, instruction);
        self
    }

    pub fn add_global(&mut self, global: GlobalObject) -> &mut Self {
        self.globals.insert(global.address, global);
        self
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.values()
    }
}

impl Program for ProgramView {
    fn architecture(&self) -> Option<Architecture> {
        self.architecture
    }

    fn architecture_name(&self) -> String {
        match (&self.architecture_name, self.architecture) {
            (Some(name), _) => name.clone(),
            (None, Some(arch)) => arch.to_string(),
            (None, None) => "unknown".to_string(),
        }
    }

    fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn functions(&self) -> &[Function] {
        &self.functions
    }

    fn instruction_at(&self, address: u64) -> Option<&Instruction> {
        self.instructions.get(&address)
    }

    fn next_instruction(&self, insn: &Instruction) -> Option<&Instruction> {
        let owner = self.function_containing(insn.address)?;
        let end = owner.end.get()?;
        self.instructions
            .range((Bound::Excluded(insn.address), Bound::Excluded(end)))
            .map(|(_, next)| next)
            .next()
    }

    fn next_instruction_in(&self, function: &Function, insn: &Instruction) -> Option<&Instruction> {
        let end = function.end.get()?;
        self.instructions
            .range((Bound::Excluded(insn.address), Bound::Excluded(end)))
            .map(|(_, next)| next)
            .next()
    }

    fn function_containing(&self, address: u64) -> Option<&Function> {
        self.function_starts
            .range(..=address)
            .rev()
            .map(|(_, idx)| &self.functions[*idx])
            .find(|f| f.contains(address))
    }

    fn global_object(&self, address: u64) -> Option<&GlobalObject> {
        self.globals.get(&address)
    }

    fn next_array_object(&self, from: u64, end: u64) -> Option<&GlobalObject> {
        if from >= end {
            return None;
        }
        self.globals
            .range(from..end)
            .map(|(_, obj)| obj)
            .find(|obj| obj.data_array().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::function::Linkage;
    use crate::core::global::{Initializer, ObjectType};
    use crate::core::program::InstructionChain;
    use crate::core::segment::SegmentKind;

    fn sample_view() -> ProgramView {
        let mut view = ProgramView::new(Architecture::X86);
        view.add_segment(Segment::new(".text", 0x1000, 0x1040, SegmentKind::Code))
            .add_function(Function::new("f", 0x1000, 0x1010, Linkage::DecompilerDefined))
            .add_function(Function::new("g", 0x1010, 0x1020, Linkage::DecompilerDefined))
            .add_instruction(Instruction::new(0x1000, 4, "push ebp"))
            .add_instruction(Instruction::new(0x100a, 4, "ret"))
            .add_instruction(Instruction::new(0x1010, 1, "ret"));
        view
    }

    #[test]
    fn chain_stays_inside_function() {
        let view = sample_view();
        let f = view.functions()[0].clone();
        let addrs: Vec<u64> = InstructionChain::of_function(&view, &f)
            .map(|i| i.address)
            .collect();
        assert_eq!(addrs, vec![0x1000, 0x100a]);

        let last = view.instruction_at(0x100a).unwrap();
        assert!(view.next_instruction(last).is_none());
    }

    #[test]
    fn chain_of_outer_function_spans_nested_one() {
        let mut view = ProgramView::new(Architecture::X86);
        view.add_function(Function::new("outer", 0x1000, 0x1010, Linkage::DecompilerDefined))
            .add_function(Function::new("inner", 0x1004, 0x1008, Linkage::DecompilerDefined));
        for address in (0x1000..0x1010).step_by(4) {
            view.add_instruction(Instruction::new(address, 4, "nop"));
        }
        let outer = view.functions()[0].clone();
        let inner = view.functions()[1].clone();

        let addrs: Vec<u64> = InstructionChain::of_function(&view, &outer)
            .map(|i| i.address)
            .collect();
        assert_eq!(addrs, vec![0x1000, 0x1004, 0x1008, 0x100c]);

        let addrs: Vec<u64> = InstructionChain::of_function(&view, &inner)
            .map(|i| i.address)
            .collect();
        assert_eq!(addrs, vec![0x1004]);

        // Unbound lookups still stop at the innermost owner.
        let at_inner = view.instruction_at(0x1004).unwrap();
        assert!(view.next_instruction(at_inner).is_none());
    }

    #[test]
    fn function_lookup_by_address() {
        let view = sample_view();
        assert_eq!(view.function_containing(0x1005).map(|f| f.name.as_str()), Some("f"));
        assert_eq!(view.function_containing(0x1010).map(|f| f.name.as_str()), Some("g"));
        assert!(view.function_containing(0x1020).is_none());
        assert!(view.function_containing(0x0fff).is_none());
    }

    #[test]
    fn undefined_functions_are_listed_but_not_indexed() {
        let mut view = sample_view();
        view.add_function(Function::external("printf", Linkage::DynamicallyLinked));
        assert_eq!(view.functions().len(), 3);
        assert!(view.function_containing(0).is_none());
    }

    #[test]
    fn array_object_search() {
        let mut view = sample_view();
        view.add_global(GlobalObject::new(0x2000, ObjectType::Plain, Some(Initializer::Other)))
            .add_global(GlobalObject::c_string(0x2008, b"hi\0"));
        assert_eq!(view.next_array_object(0x2000, 0x2010).map(|g| g.address), Some(0x2008));
        assert!(view.next_array_object(0x2000, 0x2008).is_none());
        assert!(view.next_array_object(0x2010, 0x2000).is_none());
        assert!(view.global_object(0x2000).is_some());
    }

    #[test]
    fn architecture_naming() {
        let mut view = ProgramView::new(Architecture::MIPS);
        assert_eq!(view.architecture_name(), "mips");
        view.set_architecture_name("mips32le");
        assert_eq!(view.architecture_name(), "mips32le");
        assert_eq!(ProgramView::without_architecture().architecture(), None);
    }
}
