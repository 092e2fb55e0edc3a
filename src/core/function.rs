use crate::core::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linkage classification assigned by function analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    /// Library code linked into the binary
    StaticallyLinked,
    /// Imported from a shared library
    DynamicallyLinked,
    /// System call wrapper
    Syscall,
    /// Instruction idiom; never carries a real address
    Idiom,
    /// Function discovered by the decompiler
    DecompilerDefined,
    /// Function declared by the user
    UserDefined,
}

impl Linkage {
    /// Phrase printed before `function:` in the listing header.
    pub fn phrase(&self) -> Option<&'static str> {
        match self {
            Linkage::StaticallyLinked => Some("statically linked"),
            Linkage::DynamicallyLinked => Some("dynamically linked"),
            Linkage::Syscall => Some("system-call"),
            Linkage::Idiom => Some("instruction-idiom"),
            Linkage::DecompilerDefined | Linkage::UserDefined => None,
        }
    }

    /// Only decompiler- and user-defined functions have a body to disassemble.
    pub fn has_body(&self) -> bool {
        matches!(self, Linkage::DecompilerDefined | Linkage::UserDefined)
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::StaticallyLinked => write!(f, "statically-linked"),
            Linkage::DynamicallyLinked => write!(f, "dynamically-linked"),
            Linkage::Syscall => write!(f, "syscall"),
            Linkage::Idiom => write!(f, "idiom"),
            Linkage::DecompilerDefined => write!(f, "decompiler-defined"),
            Linkage::UserDefined => write!(f, "user-defined"),
        }
    }
}

/// An address-bounded unit of code `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,

    /// Explicit display name; wins over `name` when non-empty
    pub real_name: Option<String>,

    /// Entry address (undefined for idioms and unresolved imports)
    pub start: Address,

    /// End address
    pub end: Address,

    pub linkage: Linkage,
}

impl Function {
    pub fn new(name: impl Into<String>, start: u64, end: u64, linkage: Linkage) -> Self {
        Function {
            name: name.into(),
            real_name: None,
            start: Address::new(start),
            end: Address::new(end),
            linkage,
        }
    }

    /// A function with no resolvable address
    pub fn external(name: impl Into<String>, linkage: Linkage) -> Self {
        Function {
            name: name.into(),
            real_name: None,
            start: Address::UNDEFINED,
            end: Address::UNDEFINED,
            linkage,
        }
    }

    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    /// Name used everywhere in the listing.
    pub fn display_name(&self) -> &str {
        match self.real_name.as_deref() {
            Some(real) if !real.is_empty() => real,
            _ => &self.name,
        }
    }

    pub fn contains(&self, address: u64) -> bool {
        match (self.start.get(), self.end.get()) {
            (Some(start), Some(end)) => address >= start && address < end,
            _ => false,
        }
    }
}
