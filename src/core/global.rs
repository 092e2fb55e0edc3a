//! Recovered global objects.
//!
//! A `GlobalObject` associates an address with a constant recovered earlier
//! in the pipeline. The listing only cares about objects whose initializer
//! is a data array, which it renders as an 8-bit or wide string literal.

use serde::{Deserialize, Serialize};

/// Declared type of a recovered object, as far as the listing needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    Plain,
    String,
    WideString,
}

/// A constant array of integer elements of one width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataArray {
    /// Element width in bits (8 for C strings, 16/32 for wide strings)
    pub element_bits: u32,
    pub elements: Vec<u64>,
}

impl DataArray {
    pub fn new(element_bits: u32, elements: Vec<u64>) -> Self {
        Self {
            element_bits,
            elements,
        }
    }

    /// 8-bit array built from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(8, bytes.iter().map(|b| *b as u64).collect())
    }

    /// 16-bit array built from UTF-16 code units
    pub fn from_utf16(units: &[u16]) -> Self {
        Self::new(16, units.iter().map(|u| *u as u64).collect())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// An 8-bit array with exactly one NUL, in the last position.
    pub fn is_c_string(&self) -> bool {
        if self.element_bits != 8 {
            return false;
        }
        match self.elements.split_last() {
            Some((&0, body)) => body.iter().all(|e| *e != 0),
            _ => false,
        }
    }

    /// Bytes of a C string without its terminator.
    pub fn c_string_bytes(&self) -> Option<Vec<u8>> {
        if !self.is_c_string() {
            return None;
        }
        let body = &self.elements[..self.elements.len() - 1];
        Some(body.iter().map(|e| *e as u8).collect())
    }
}

/// Constant initializer of a global object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Initializer {
    Array(DataArray),
    /// Any other constant (scalars, structures, pointers)
    Other,
}

/// An address-anchored constant recovered by earlier analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalObject {
    pub address: u64,
    pub name: Option<String>,
    pub ty: ObjectType,
    pub initializer: Option<Initializer>,
}

impl GlobalObject {
    pub fn new(address: u64, ty: ObjectType, initializer: Option<Initializer>) -> Self {
        Self {
            address,
            name: None,
            ty,
            initializer,
        }
    }

    /// C string object from raw bytes (terminator included by the caller).
    pub fn c_string(address: u64, bytes: &[u8]) -> Self {
        Self::new(
            address,
            ObjectType::String,
            Some(Initializer::Array(DataArray::from_bytes(bytes))),
        )
    }

    /// Wide string object from UTF-16 code units.
    pub fn wide_string(address: u64, units: &[u16]) -> Self {
        Self::new(
            address,
            ObjectType::WideString,
            Some(Initializer::Array(DataArray::from_utf16(units))),
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The array initializer, if the object has one.
    pub fn data_array(&self) -> Option<&DataArray> {
        match &self.initializer {
            Some(Initializer::Array(array)) => Some(array),
            _ => None,
        }
    }
}
