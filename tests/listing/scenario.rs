//! Exact listings for small programs.

use dsmwriter::ListingStats;

use crate::common::{fixed_timestamp, scenario};

const HEADER: &str = ";;\n;; This file was generated by dsmwriter\n;; Architecture: x86\n;;\n";
const CODE_BANNER: &str = "\n;;\n;; Code Segment\n;;\n\n";
const DATA_BANNER: &str = "\n;;\n;; Data Segment\n;;\n\n";

#[test]
fn scenario_listing_is_exact() {
    let fx = scenario();
    let expected = [
        HEADER,
        CODE_BANNER,
        "; section: .text\n",
        "; function: F at 0x1000 -- 0x1008\n",
        "0x1000:   b8 01 00 00   \tmov eax, 1\n",
        "0x1004:   c3 90 90 90   \tret\n",
        "; data inside code section at 0x1008 -- 0x1010\n",
        "0x1008:   de ad be ef 41 42 43 00                            |....ABC.        |\n",
        DATA_BANNER,
    ]
    .concat();
    assert_eq!(fx.render(), expected);
}

#[test]
fn scenario_stats() {
    let fx = scenario();
    let mut sink = Vec::new();
    let stats = fx
        .writer()
        .with_timestamp(fixed_timestamp())
        .render(&mut sink)
        .unwrap()
        .unwrap();
    assert_eq!(
        stats,
        ListingStats {
            code_segments: 1,
            data_segments: 0,
            functions: 1,
            instructions: 2,
            embedded_ranges: 1,
            data_lines: 1,
        }
    );
}

#[test]
fn timestamped_header() {
    let fx = scenario();
    let text = fx
        .writer()
        .with_timestamp(fixed_timestamp())
        .render_to_string()
        .unwrap()
        .unwrap();
    let header = ";;\n\
        ;; This file was generated by dsmwriter\n\
        ;; Copyright (c) 2023\n\
        ;;\n\
        ;; Generation date: 2023-11-02 09:30:00\n\
        ;; Architecture: x86\n\
        ;;\n";
    assert!(text.starts_with(header));
    // Everything after the header is independent of the timestamp.
    assert_eq!(&text[header.len()..], &fx.render()[HEADER.len()..]);
}

#[test]
fn mixed_program_annotations() {
    let fx = crate::common::mixed_program();
    let text = fx.render();
    assert!(text.contains("\tcall 0x1010 <g>\n"));
    assert!(text.contains("\tmov eax, [0x2004] ; \"hello\"\n"));
    assert!(text.contains("; function: f at 0x1000 -- 0x100a\n"));
    assert!(text.contains("; function: g at 0x1010 -- 0x1020\n"));
    assert!(text.contains("; data inside code section at 0x1004 -- 0x1006\n"));
    assert!(text.contains("; data inside code section at 0x100a -- 0x1010\n"));
}

#[test]
fn string_objects_show_their_values() {
    let fx = crate::common::mixed_program();
    let text = fx.render();
    let line_at = |prefix: &str| {
        text.lines()
            .find(|l| l.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line at {prefix}"))
            .to_string()
    };
    assert!(line_at("0x2004:").ends_with("|hello.          |   \"hello\""));
    assert!(line_at("0x2010:").ends_with("|A.B...          |   L\"AB\""));
    // Plain blocks around the objects carry no value.
    assert!(line_at("0x2000:").ends_with("|....            |"));
    assert!(line_at("0x200a:").ends_with('|'));
}
