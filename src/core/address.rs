//! Address type for listing generation.
//!
//! An `Address` is an unsigned value that may be undefined. Undefined is a
//! distinct state (not zero) and reports no value, so callers cannot
//! dereference it by accident.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A possibly-undefined location in the program's address space.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(Option<u64>);

impl Address {
    /// The undefined address.
    pub const UNDEFINED: Address = Address(None);

    /// Create a defined address.
    pub const fn new(value: u64) -> Self {
        Address(Some(value))
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_undefined(&self) -> bool {
        self.0.is_none()
    }

    /// Numeric value, or `None` when undefined.
    pub fn get(&self) -> Option<u64> {
        self.0
    }

    /// Distance from `other` to `self`, when both are defined and `self >= other`.
    pub fn offset_from(&self, other: Address) -> Option<u64> {
        self.0?.checked_sub(other.0?)
    }

    /// Render as `0x`-prefixed lowercase hexadecimal.
    pub fn to_hex_prefix_string(&self) -> String {
        self.to_string()
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

/// Adding to an undefined address keeps it undefined.
impl Add<u64> for Address {
    type Output = Address;

    fn add(self, rhs: u64) -> Address {
        Address(self.0.map(|v| v.wrapping_add(rhs)))
    }
}

impl AddAssign<u64> for Address {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:#x}", v),
            None => write!(f, "<undefined>"),
        }
    }
}
