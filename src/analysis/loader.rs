//! Object-file loading: sections, bytes and function seeds.
//!
//! Parses ELF/PE/Mach-O through `object` and turns the section table into
//! listing segments, the loaded bytes into a [`MappedImage`] and defined
//! function symbols into [`Function`] seeds. Files are memory-mapped.

use memmap2::Mmap;
use object::{Object, ObjectSection, ObjectSymbol, SectionKind, SymbolKind};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

use crate::analysis::memory::MappedImage;
use crate::core::disassembler::{Architecture, Endianness};
use crate::core::function::{Function, Linkage};
use crate::core::global::GlobalObject;
use crate::core::segment::{Segment, SegmentKind};
use crate::error::{DsmError, Result};

/// Largest file `load_file` accepts (100MB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Everything a listing needs from an object file, before decoding.
#[derive(Debug, Clone)]
pub struct LoadedBinary {
    pub architecture: Architecture,
    pub endianness: Endianness,
    /// Sections in file order
    pub segments: Vec<Segment>,
    pub image: MappedImage,
    /// Functions from defined, sized text symbols, ascending by start
    pub functions: Vec<Function>,
    /// NUL-terminated strings named by data symbols in read-only sections
    pub globals: Vec<GlobalObject>,
}

fn map_architecture(arch: object::Architecture) -> Architecture {
    match arch {
        object::Architecture::I386 => Architecture::X86,
        object::Architecture::X86_64 => Architecture::X86_64,
        object::Architecture::Arm => Architecture::ARM,
        object::Architecture::Aarch64 => Architecture::ARM64,
        object::Architecture::Mips => Architecture::MIPS,
        object::Architecture::Mips64 => Architecture::MIPS64,
        object::Architecture::PowerPc => Architecture::PPC,
        object::Architecture::PowerPc64 => Architecture::PPC64,
        object::Architecture::Riscv32 => Architecture::RISCV,
        object::Architecture::Riscv64 => Architecture::RISCV64,
        _ => Architecture::Unknown,
    }
}

/// Listing classification of an object section.
pub fn classify_section(kind: SectionKind) -> SegmentKind {
    match kind {
        SectionKind::Text => SegmentKind::Code,
        SectionKind::Data
        | SectionKind::UninitializedData
        | SectionKind::Common
        | SectionKind::Tls
        | SectionKind::UninitializedTls => SegmentKind::Data,
        SectionKind::ReadOnlyData
        | SectionKind::ReadOnlyDataWithRel
        | SectionKind::ReadOnlyString => SegmentKind::ConstData,
        _ => SegmentKind::Other,
    }
}

/// Load an object file held in memory.
pub fn load(data: &[u8]) -> Result<LoadedBinary> {
    let obj = object::File::parse(data).map_err(|e| DsmError::InvalidFormat(e.to_string()))?;
    let architecture = map_architecture(obj.architecture());
    let endianness = if obj.is_little_endian() {
        Endianness::Little
    } else {
        Endianness::Big
    };

    let mut segments = Vec::new();
    let mut image = MappedImage::new();
    for section in obj.sections() {
        let size = section.size();
        let address = section.address();
        let kind = classify_section(section.kind());
        // Non-allocated sections (symbol tables, debug info) sit at address 0.
        if size == 0 || (address == 0 && kind == SegmentKind::Other) {
            continue;
        }
        let name = section.name().unwrap_or("").to_string();
        let bytes = match section.kind() {
            SectionKind::UninitializedData | SectionKind::UninitializedTls | SectionKind::Common => {
                Vec::new()
            }
            _ => section.data().map(|d| d.to_vec()).unwrap_or_else(|e| {
                warn!(section = %name, error = %e, "section data unavailable");
                Vec::new()
            }),
        };
        image.map_sized(address, size, bytes);
        segments.push(Segment::new(name, address, address.saturating_add(size), kind));
    }

    let in_code = |addr: u64| {
        segments
            .iter()
            .any(|s| s.kind.is_code() && s.contains(addr))
    };
    let in_const = |addr: u64| {
        segments
            .iter()
            .any(|s| s.kind == SegmentKind::ConstData && s.contains(addr))
    };

    let mut by_start: BTreeMap<u64, Function> = BTreeMap::new();
    let mut globals = Vec::new();
    for sym in obj.symbols() {
        if !sym.is_definition() || sym.address() == 0 {
            continue;
        }
        let (address, size) = (sym.address(), sym.size());
        let name = sym.name().unwrap_or("");
        match sym.kind() {
            SymbolKind::Text if size > 0 && in_code(address) => {
                let name = if name.is_empty() {
                    format!("function_{:x}", address)
                } else {
                    name.to_string()
                };
                by_start.entry(address).or_insert_with(|| {
                    Function::new(name, address, address + size, Linkage::DecompilerDefined)
                });
            }
            SymbolKind::Data if size > 0 && in_const(address) => {
                if let Some(global) = c_string_object(&image, address, size, name) {
                    globals.push(global);
                }
            }
            _ => {}
        }
    }

    let entry = obj.entry();
    if by_start.is_empty() && entry != 0 && in_code(entry) {
        if let Some(end) = segments
            .iter()
            .find(|s| s.kind.is_code() && s.contains(entry))
            .and_then(|s| s.end.get())
        {
            by_start.insert(
                entry,
                Function::new("entry_point", entry, end, Linkage::DecompilerDefined),
            );
        }
    }

    debug!(
        %architecture,
        segments = segments.len(),
        functions = by_start.len(),
        strings = globals.len(),
        "object loaded"
    );

    Ok(LoadedBinary {
        architecture,
        endianness,
        segments,
        image,
        functions: by_start.into_values().collect(),
        globals,
    })
}

/// Memory-map and load an object file.
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedBinary> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    debug!(path = %path.display(), size, "loading object file");
    if size == 0 {
        return Err(DsmError::InvalidFormat(format!(
            "{} is empty",
            path.display()
        )));
    }
    if size > MAX_FILE_SIZE {
        return Err(DsmError::InvalidFormat(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            size,
            MAX_FILE_SIZE
        )));
    }
    // Safety: read-only map of a regular file that outlives the parse.
    let mmap = unsafe { Mmap::map(&file)? };
    load(&mmap)
}

/// String object for a data symbol whose bytes end in the only NUL.
fn c_string_object(image: &MappedImage, address: u64, size: u64, name: &str) -> Option<GlobalObject> {
    use crate::analysis::memory::MemoryView;

    let bytes = image.read_exact(address, size as usize).ok()?;
    let object = GlobalObject::c_string(address, &bytes);
    let array = object.data_array()?;
    if !array.is_c_string() {
        return None;
    }
    Some(if name.is_empty() {
        object
    } else {
        object.with_name(name)
    })
}
