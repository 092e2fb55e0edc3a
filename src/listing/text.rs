//! Text utilities: literal escaping and disassembly text normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// `+ -N`: addition of a literal negative number.
static NEGATIVE_ADDEND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+\s*-(\s*[0-9])").expect("valid negative addend regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Printable ASCII, space included.
pub fn is_printable(c: u64) -> bool {
    (0x20..0x7f).contains(&c)
}

fn escape_unit(out: &mut String, c: u64, hex_digits: usize, mask: u64) {
    match c {
        0x07 => out.push_str("\\a"),
        0x08 => out.push_str("\\b"),
        0x0c => out.push_str("\\f"),
        0x0a => out.push_str("\\n"),
        0x0d => out.push_str("\\r"),
        0x09 => out.push_str("\\t"),
        0x0b => out.push_str("\\v"),
        0x5c => out.push_str("\\\\"),
        0x22 => out.push_str("\\\""),
        c if is_printable(c) => out.push(c as u8 as char),
        c => {
            let _ = write!(out, "\\x{:0width$x}", c & mask, width = hex_digits);
        }
    }
}

/// Escape 8-bit text for a C string literal.
///
/// Control characters get their two-character escapes, other non-printable
/// bytes become `\xHH`.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for b in bytes {
        escape_unit(&mut out, *b as u64, 2, 0xff);
    }
    out
}

/// Escape wide text code unit by code unit.
///
/// Non-printable units become `\x` followed by `element_bits / 4` hex digits.
pub fn escape_wide(units: &[u64], element_bits: u32) -> String {
    let bits = element_bits.clamp(8, 64);
    let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
    let digits = bits.div_ceil(4) as usize;
    let mut out = String::with_capacity(units.len());
    for u in units {
        escape_unit(&mut out, *u & mask, digits, mask);
    }
    out
}

/// Rewrite `+ -N` into `- N`.
pub fn reduce_negative_numbers(text: &str) -> String {
    NEGATIVE_ADDEND.replace_all(text, "- $1").into_owned()
}

/// Collapse whitespace runs into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Canonical form of disassembly text.
pub fn normalize_disassembly(text: &str) -> String {
    let reduced = reduce_negative_numbers(text);
    collapse_whitespace(&reduced).replace(" ,", ",")
}
