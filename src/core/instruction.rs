//! Instruction and Operand types for decoded instructions.
//!
//! An `Instruction` is one decoded machine instruction as the listing sees
//! it: where it lives, how many bytes it covers, its printed text, what kind
//! of control transfer it performs, and (for x86) structured operands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of operands that can appear in instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// Register operand
    Register,
    /// Immediate value operand
    Immediate,
    /// Memory reference operand
    Memory,
    /// Anything the decoder does not model
    Other,
}

/// Structured operand representation for instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    /// Type of operand
    pub kind: OperandKind,
    /// Register name (for Register operands)
    pub register: Option<String>,
    /// Immediate value (for Immediate operands)
    pub immediate: Option<i64>,
    /// Memory displacement (for Memory operands)
    pub displacement: Option<i64>,
    /// Memory segment override register (for Memory operands)
    pub segment: Option<String>,
    /// Memory scale factor (for Memory operands)
    pub scale: Option<u8>,
    /// Memory base register (for Memory operands)
    pub base: Option<String>,
    /// Memory index register (for Memory operands)
    pub index: Option<String>,
}

impl Operand {
    fn empty(kind: OperandKind) -> Self {
        Self {
            kind,
            register: None,
            immediate: None,
            displacement: None,
            segment: None,
            scale: None,
            base: None,
            index: None,
        }
    }

    /// Create a new register operand
    pub fn register(name: impl Into<String>) -> Self {
        Self {
            register: Some(name.into()),
            ..Self::empty(OperandKind::Register)
        }
    }

    /// Create a new immediate operand
    pub fn immediate(value: i64) -> Self {
        Self {
            immediate: Some(value),
            ..Self::empty(OperandKind::Immediate)
        }
    }

    /// Create a new memory operand
    pub fn memory(
        displacement: i64,
        base: Option<String>,
        index: Option<String>,
        scale: u8,
        segment: Option<String>,
    ) -> Self {
        Self {
            displacement: Some(displacement),
            base,
            index,
            scale: Some(scale),
            segment,
            ..Self::empty(OperandKind::Memory)
        }
    }

    /// An operand the decoder does not model
    pub fn other() -> Self {
        Self::empty(OperandKind::Other)
    }

    /// Absolute memory reference: no base, index or segment, scale 1.
    pub fn is_absolute_memory(&self) -> bool {
        self.kind == OperandKind::Memory
            && self.base.is_none()
            && self.index.is_none()
            && self.segment.is_none()
            && self.scale.unwrap_or(1) == 1
    }

    /// Value that may be the address of a string literal.
    ///
    /// Immediates and absolute memory displacements qualify; everything else
    /// returns `None`.
    pub fn literal_address(&self) -> Option<u64> {
        match self.kind {
            OperandKind::Immediate => self.immediate.map(|v| v as u64),
            OperandKind::Memory if self.is_absolute_memory() => {
                self.displacement.map(|d| d as u64)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperandKind::Register => write!(f, "{}", self.register.as_deref().unwrap_or("?")),
            OperandKind::Immediate => write!(f, "{:#x}", self.immediate.unwrap_or(0)),
            OperandKind::Memory => {
                if let Some(seg) = &self.segment {
                    write!(f, "{}:", seg)?;
                }
                write!(f, "[")?;
                let mut first = true;
                if let Some(base) = &self.base {
                    write!(f, "{}", base)?;
                    first = false;
                }
                if let Some(index) = &self.index {
                    if !first {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", index)?;
                    if let Some(scale) = self.scale.filter(|s| *s > 1) {
                        write!(f, " * {}", scale)?;
                    }
                    first = false;
                }
                let disp = self.displacement.unwrap_or(0);
                if first {
                    write!(f, "{:#x}", disp)?;
                } else if disp > 0 {
                    write!(f, " + {:#x}", disp)?;
                } else if disp < 0 {
                    write!(f, " - {:#x}", disp.unsigned_abs())?;
                }
                write!(f, "]")
            }
            OperandKind::Other => write!(f, "?"),
        }
    }
}

/// Targets of a branch instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTargets {
    /// Whether the branch has a fallthrough path
    pub conditional: bool,
    /// Address of the instruction reached when the branch is taken
    pub taken: Option<u64>,
    /// Address of the instruction reached when a conditional branch is not taken
    pub fallthrough: Option<u64>,
}

impl BranchTargets {
    pub fn unconditional(taken: Option<u64>) -> Self {
        Self {
            conditional: false,
            taken,
            fallthrough: None,
        }
    }

    pub fn conditional(taken: Option<u64>, fallthrough: Option<u64>) -> Self {
        Self {
            conditional: true,
            taken,
            fallthrough,
        }
    }
}

/// Control transfer performed by an instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlFlow {
    /// Falls through to the next instruction
    #[default]
    Sequential,
    /// Call; `callee` is the called function's entry when statically known
    Call { callee: Option<u64> },
    /// Direct or indirect branch
    Branch(BranchTargets),
}

impl ControlFlow {
    pub fn is_transfer(&self) -> bool {
        !matches!(self, ControlFlow::Sequential)
    }
}

/// Decoded instruction at a specific address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Address where this instruction is located
    pub address: u64,
    /// Length of the instruction in bytes
    pub size: u32,
    /// Disassembly text (mnemonic and operands)
    pub text: String,
    /// Control transfer semantics
    pub flow: ControlFlow,
    /// Structured operands (populated by x86 decoders)
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(address: u64, size: u32, text: impl Into<String>) -> Self {
        Self {
            address,
            size,
            text: text.into(),
            flow: ControlFlow::Sequential,
            operands: Vec::new(),
        }
    }

    pub fn with_flow(mut self, flow: ControlFlow) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_operands(mut self, operands: Vec<Operand>) -> Self {
        self.operands = operands;
        self
    }

    /// First address past this instruction
    pub fn end_address(&self) -> u64 {
        self.address.wrapping_add(self.size as u64)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}: {}", self.address, self.text)
    }
}
