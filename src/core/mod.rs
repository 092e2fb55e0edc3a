//! Core data types for listing generation.
//!
//! This module contains the address-space model the listing renders:
//! addresses, segments, functions, decoded instructions, recovered global
//! objects, and the collaborator traits through which they are queried.

pub mod address;
pub mod disassembler;
pub mod function;
pub mod global;
pub mod instruction;
pub mod program;
pub mod segment;

pub use address::Address;
pub use disassembler::{Architecture, Capabilities, Endianness};
pub use function::{Function, Linkage};
pub use global::{DataArray, GlobalObject, Initializer, ObjectType};
pub use instruction::{BranchTargets, ControlFlow, Instruction, Operand, OperandKind};
pub use program::{InstructionChain, NaturalTypeSizes, Program, TypeSizes};
pub use segment::{Segment, SegmentKind};
