//! Data pass and the hex+ASCII byte dump shared with embedded code data.

use std::io::Write;
use tracing::{debug, trace, warn};

use super::text::{escape_bytes, escape_wide, is_printable};
use super::Renderer;
use crate::core::address::Address;
use crate::core::global::{GlobalObject, ObjectType};
use crate::error::Result;

impl<W: Write> Renderer<'_, W> {
    pub(crate) fn data_pass(&mut self) -> Result<()> {
        self.pass_banner("Data Segment")?;
        let program = self.program;
        for segment in program.segments().iter().filter(|s| s.kind.is_data()) {
            writeln!(self.out, "; section: {}", segment.name)?;
            let Some((start, end)) = segment.bounds() else {
                warn!(section = %segment.name, "data segment without defined bounds skipped");
                continue;
            };
            self.stats.data_segments += 1;
            debug!(section = %segment.name, start = %Address::new(start), end = %Address::new(end), "rendering data segment");
            self.data_range(start, end)?;
        }
        Ok(())
    }

    /// Dump `[start, end)`, giving every string object its own block with
    /// the decoded value next to its first line.
    pub(crate) fn data_range(&mut self, start: u64, end: u64) -> Result<()> {
        let program = self.program;
        let mut addr = start;
        while addr < end {
            let found = program
                .next_array_object(addr, end)
                .and_then(|obj| obj.data_array().map(|array| (obj, array)));
            let Some((object, array)) = found else {
                self.data_block(addr, end - addr, None)?;
                break;
            };

            if addr < object.address {
                self.data_block(addr, object.address - addr, None)?;
                addr = object.address;
            }

            // An object may run past `end`; it is still dumped whole.
            let size = self.sizes.array_byte_size(array).max(1);
            let value = self.object_string(object);
            trace!(address = %Address::new(addr), size, "array object");
            self.data_block(addr, size, Some(value.as_str()).filter(|v| !v.is_empty()))?;
            addr = addr.saturating_add(size);
        }
        Ok(())
    }

    /// Plain hex+ASCII lines for `size` bytes at `start`.
    fn data_block(&mut self, start: u64, size: u64, value: Option<&str>) -> Result<()> {
        let per_line = self.config.bytes_per_line as u64;
        let halving = self.config.halving_index().map(|i| i as u64);
        let gap = self.config.column_gap.as_str();

        let mut off = 0u64;
        while off < size {
            let mut line = self.address_column(start.wrapping_add(off));
            let mut ascii = String::from("|");
            for i in 0..per_line {
                if off + i < size {
                    match self.memory.read_byte(start.wrapping_add(off + i)) {
                        Ok(b) => {
                            line.push_str(&format!("{:02x}", b));
                            ascii.push(if is_printable(b as u64) { b as char } else { '.' });
                        }
                        Err(_) => {
                            line.push_str("??");
                            ascii.push('?');
                        }
                    }
                } else {
                    line.push_str("  ");
                    ascii.push(' ');
                }
                if halving == Some(i) {
                    line.push(' ');
                }
                if i + 1 < per_line {
                    line.push(' ');
                }
            }
            ascii.push('|');

            line.push_str(gap);
            line.push_str(&ascii);
            if off == 0 {
                if let Some(value) = value {
                    line.push_str(gap);
                    line.push_str(value);
                }
            }
            writeln!(self.out, "{}", line)?;
            self.stats.data_lines += 1;
            off += per_line;
        }
        Ok(())
    }

    /// Quoted literal of a string object; empty for any other object.
    pub(crate) fn object_string(&self, object: &GlobalObject) -> String {
        let Some(array) = object.data_array() else {
            return String::new();
        };
        if let Some(bytes) = array.c_string_bytes() {
            return format!("\"{}\"", escape_bytes(&bytes));
        }
        if object.ty == ObjectType::WideString {
            let mut units = array.elements.as_slice();
            if let Some((&0, body)) = units.split_last() {
                units = body;
            }
            let bits = self.sizes.element_bit_size(array);
            return format!("L\"{}\"", escape_wide(units, bits));
        }
        String::new()
    }
}
