//! Column and coverage properties over a mixed program.

use std::collections::BTreeMap;

use dsmwriter::core::program::Program;

use crate::common::{byte_lines, mixed_program, parse_byte_line};

/// `0x10004` is the longest segment end: seven characters.
const HEX_START: usize = "0x10004:".len() + "   ".len();

#[test]
fn rendering_is_deterministic() {
    let fx = mixed_program();
    assert_eq!(fx.render(), fx.render());
}

#[test]
fn hex_column_starts_at_one_offset() {
    let fx = mixed_program();
    let text = fx.render();
    let mut seen = 0;
    for line in byte_lines(&text) {
        let (address_column, hex) = line.split_at(HEX_START);
        assert!(address_column.trim_end().ends_with(':'), "{line:?}");
        assert!(!hex.starts_with(' '), "{line:?}");
        seen += 1;
    }
    assert!(seen > 10);
}

#[test]
fn disassembly_starts_at_one_offset() {
    let fx = mixed_program();
    let text = fx.render();
    // Longest instruction is 8 bytes: 23 hex characters, then the gap.
    let tab = HEX_START + 23 + 3;
    let instruction_lines: Vec<&str> = byte_lines(&text).filter(|l| l.contains('\t')).collect();
    assert_eq!(instruction_lines.len(), 4);
    for line in instruction_lines {
        assert_eq!(line.find('\t'), Some(tab), "{line:?}");
    }
}

#[test]
fn every_segment_byte_is_dumped_once() {
    let fx = mixed_program();
    let text = fx.render();

    let mut dumped: BTreeMap<u64, usize> = BTreeMap::new();
    for line in byte_lines(&text) {
        let (address, count) = parse_byte_line(line);
        for offset in 0..count as u64 {
            *dumped.entry(address + offset).or_default() += 1;
        }
    }

    // Blank padding is not counted, so partial lines contribute only
    // their real bytes.
    let mut expected = BTreeMap::new();
    for segment in fx.view.segments() {
        let (start, end) = segment.bounds().unwrap();
        for address in start..end {
            expected.insert(address, 1usize);
        }
    }
    assert_eq!(dumped, expected);
}

#[test]
fn pass_order_is_code_then_data() {
    let fx = mixed_program();
    let text = fx.render();
    let code = text.find(";; Code Segment").unwrap();
    let data = text.find(";; Data Segment").unwrap();
    let sections: Vec<(usize, &str)> = text
        .match_indices("; section: ")
        .map(|(pos, _)| (pos, text[pos..].lines().next().unwrap()))
        .collect();
    let names: Vec<&str> = sections.iter().map(|(_, l)| *l).collect();
    assert_eq!(
        names,
        vec![
            "; section: .text",
            "; section: .rodata",
            "; section: .data",
            "; section: .high",
        ]
    );
    assert!(code < sections[0].0 && sections[0].0 < data);
    assert!(sections[1..].iter().all(|(pos, _)| *pos > data));
}

#[test]
fn bytes_per_line_changes_data_lines_only() {
    let fx = mixed_program();
    let config = dsmwriter::ListingConfig {
        include_timestamp: false,
        bytes_per_line: 8,
        ..Default::default()
    };
    let text = fx.writer().with_config(config).render_to_string().unwrap().unwrap();
    for line in byte_lines(&text).filter(|l| !l.contains('\t')) {
        let (_, count) = parse_byte_line(line);
        assert!(count <= 8, "{line:?}");
        let ascii = &line[line.find('|').unwrap()..];
        assert_eq!(ascii.find('|'), Some(0));
        assert_eq!(ascii[1..].find('|'), Some(8), "{line:?}");
    }
}
