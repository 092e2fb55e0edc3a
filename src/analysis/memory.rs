//! MemoryView: byte-granular reads by virtual address.
//!
//! The listing reads every byte it prints through this trait. A failed read
//! is reported per byte and rendered as `??`; it never aborts a render.

use std::collections::BTreeMap;

/// Errors that can occur during memory reads.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {0:#x} is not mapped")]
    Unmapped(u64),
    #[error("address {0:#x} is mapped without file contents")]
    NoContents(u64),
}

/// Byte reads by virtual address.
pub trait MemoryView {
    /// Read one byte at `address`.
    fn read_byte(&self, address: u64) -> Result<u8, MemoryError>;

    /// Read `len` bytes starting at `address`, reporting each byte separately.
    fn read_bytes(&self, address: u64, len: usize) -> Vec<Result<u8, MemoryError>> {
        (0..len as u64)
            .map(|i| self.read_byte(address.wrapping_add(i)))
            .collect()
    }

    /// Read `len` contiguous bytes, failing on the first unreadable one.
    fn read_exact(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        self.read_bytes(address, len).into_iter().collect()
    }
}

#[derive(Debug, Clone)]
struct Region {
    size: u64,
    /// May be shorter than `size` (e.g. zero-initialized tails)
    data: Vec<u8>,
}

/// Image built from regions of owned bytes keyed by start address.
#[derive(Debug, Clone, Default)]
pub struct MappedImage {
    regions: BTreeMap<u64, Region>,
}

impl MappedImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image holding a single region whose contents are `data`.
    pub fn from_slice(base: u64, data: &[u8]) -> Self {
        let mut image = Self::new();
        image.map(base, data.to_vec());
        image
    }

    /// Map `data` at `base`; the region covers exactly `data.len()` bytes.
    pub fn map(&mut self, base: u64, data: Vec<u8>) {
        let size = data.len() as u64;
        self.map_sized(base, size, data);
    }

    /// Map a region of `size` bytes whose first `data.len()` bytes are known.
    pub fn map_sized(&mut self, base: u64, size: u64, mut data: Vec<u8>) {
        data.truncate(size as usize);
        self.regions.insert(base, Region { size, data });
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl MemoryView for MappedImage {
    fn read_byte(&self, address: u64) -> Result<u8, MemoryError> {
        let (base, region) = self
            .regions
            .range(..=address)
            .next_back()
            .ok_or(MemoryError::Unmapped(address))?;
        let offset = address - base;
        if offset >= region.size {
            return Err(MemoryError::Unmapped(address));
        }
        region
            .data
            .get(offset as usize)
            .copied()
            .ok_or(MemoryError::NoContents(address))
    }
}
