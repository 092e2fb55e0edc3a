//! Common test utilities and fixtures.
//!
//! Builders for small address spaces plus helpers that render them with a
//! fixed configuration so outputs can be compared byte for byte.

use chrono::{DateTime, Local, TimeZone};
use dsmwriter::analysis::memory::MappedImage;
use dsmwriter::analysis::view::ProgramView;
use dsmwriter::core::disassembler::Architecture;
use dsmwriter::core::function::{Function, Linkage};
use dsmwriter::core::global::GlobalObject;
use dsmwriter::core::instruction::{ControlFlow, Instruction, Operand};
use dsmwriter::core::program::NaturalTypeSizes;
use dsmwriter::core::segment::{Segment, SegmentKind};
use dsmwriter::{DsmWriter, ListingConfig};

/// A program view together with the bytes it describes.
pub struct Fixture {
    pub view: ProgramView,
    pub image: MappedImage,
}

impl Fixture {
    pub fn new(arch: Architecture) -> Self {
        Self {
            view: ProgramView::new(arch),
            image: MappedImage::new(),
        }
    }

    /// Render without the timestamp lines.
    pub fn render(&self) -> String {
        let config = ListingConfig {
            include_timestamp: false,
            ..ListingConfig::default()
        };
        self.writer().with_config(config).render_to_string().unwrap().unwrap()
    }

    pub fn writer(&self) -> DsmWriter<'_> {
        DsmWriter::new(&self.view)
            .with_memory(&self.image)
            .with_type_sizes(&NaturalTypeSizes)
    }
}

pub fn fixed_timestamp() -> DateTime<Local> {
    Local.with_ymd_and_hms(2023, 11, 2, 9, 30, 0).unwrap()
}

/// One code segment `[0x1000, 0x1010)`; `F` covers `[0x1000, 0x1008)` with
/// two 4-byte instructions, the rest of the segment belongs to no function.
pub fn scenario() -> Fixture {
    let mut fx = Fixture::new(Architecture::X86);
    fx.view
        .add_segment(Segment::new(".text", 0x1000, 0x1010, SegmentKind::Code))
        .add_function(Function::new("F", 0x1000, 0x1008, Linkage::DecompilerDefined))
        .add_instruction(Instruction::new(0x1000, 4, "mov eax, 1"))
        .add_instruction(Instruction::new(0x1004, 4, "ret"));
    fx.image.map(
        0x1000,
        vec![
            0xb8, 0x01, 0x00, 0x00, 0xc3, 0x90, 0x90, 0x90, 0xde, 0xad, 0xbe, 0xef, 0x41, 0x42,
            0x43, 0x00,
        ],
    );
    fx
}

/// Code with an inner gap and inter-function data, a read-only segment with
/// 8-bit and wide strings, a writable segment and a high segment that sets
/// the address column width.
pub fn mixed_program() -> Fixture {
    let mut fx = Fixture::new(Architecture::X86);
    fx.view
        .add_segment(Segment::new(".text", 0x1000, 0x1020, SegmentKind::Code))
        .add_segment(Segment::new(".rodata", 0x2000, 0x2020, SegmentKind::ConstData))
        .add_segment(Segment::new(".data", 0x3000, 0x3005, SegmentKind::Data))
        .add_segment(Segment::new(".high", 0x10000, 0x10004, SegmentKind::Data))
        .add_function(Function::new("f", 0x1000, 0x100a, Linkage::DecompilerDefined))
        .add_function(Function::new("g", 0x1010, 0x1020, Linkage::UserDefined))
        .add_instruction(Instruction::new(0x1000, 4, "push ebp"))
        .add_instruction(
            Instruction::new(0x1006, 4, "call 0x1010")
                .with_flow(ControlFlow::Call { callee: Some(0x1010) }),
        )
        .add_instruction(
            Instruction::new(0x1010, 8, "mov eax, [0x2004]")
                .with_operands(vec![Operand::memory(0x2004, None, None, 1, None)]),
        )
        .add_instruction(Instruction::new(0x1018, 8, "ret"))
        .add_global(GlobalObject::c_string(0x2004, b"hello\0"))
        .add_global(GlobalObject::wide_string(0x2010, &[0x41, 0x42, 0]));

    fx.image.map(0x1000, (0u8..0x20).collect());
    let mut rodata = vec![0xffu8; 0x20];
    rodata[4..10].copy_from_slice(b"hello\0");
    rodata[0x10..0x16].copy_from_slice(&[0x41, 0, 0x42, 0, 0, 0]);
    fx.image.map(0x2000, rodata);
    fx.image.map(0x3000, vec![1, 2, 3, 4, 5]);
    fx.image.map(0x10000, b"tail".to_vec());
    fx
}

/// Lines that dump bytes: instruction and data lines, not comments.
pub fn byte_lines(listing: &str) -> impl Iterator<Item = &str> {
    listing
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with(';'))
}

/// Address and number of bytes dumped by one byte line.
pub fn parse_byte_line(line: &str) -> (u64, usize) {
    let (addr, rest) = line.split_once(':').expect("address column");
    let address = u64::from_str_radix(addr.trim_start_matches("0x"), 16).expect("hex address");
    let hex = match rest.split_once('\t') {
        Some((hex, _)) => hex,
        None => rest.split_once('|').expect("ascii column").0,
    };
    (address, hex.split_whitespace().count())
}
