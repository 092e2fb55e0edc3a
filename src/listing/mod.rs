//! The `.dsm` listing generator.
//!
//! One render walks the address space in two passes: every code (or mixed)
//! segment through the code renderer, then every data (or constant-data)
//! segment through the data renderer. Column widths and the function-start
//! map are built once per render, before the first line is written, and are
//! read-only afterwards.

pub mod annotate;
pub mod code;
pub mod config;
pub mod data;
pub mod layout;
pub mod text;

pub use config::ListingConfig;
pub use layout::ColumnLayout;

use chrono::{DateTime, Datelike, Local};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info};

use crate::analysis::memory::MemoryView;
use crate::core::disassembler::{Architecture, Capabilities};
use crate::core::function::Function;
use crate::core::program::{Program, TypeSizes};
use crate::error::Result;

/// Counters collected during one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    pub code_segments: usize,
    pub data_segments: usize,
    pub functions: usize,
    pub instructions: usize,
    /// `; data inside code section` ranges
    pub embedded_ranges: usize,
    /// Plain hex+ASCII lines, including string object lines
    pub data_lines: usize,
}

/// Renders a [`Program`] into a `.dsm` listing.
///
/// The writer needs the program, a byte image and an ABI size oracle. When
/// any of them is missing (or the program reports no architecture),
/// [`DsmWriter::render`] writes nothing and returns `Ok(None)`.
pub struct DsmWriter<'a> {
    program: &'a dyn Program,
    memory: Option<&'a dyn MemoryView>,
    sizes: Option<&'a dyn TypeSizes>,
    config: ListingConfig,
    generated_at: Option<DateTime<Local>>,
}

impl<'a> DsmWriter<'a> {
    pub fn new(program: &'a dyn Program) -> Self {
        Self {
            program,
            memory: None,
            sizes: None,
            config: ListingConfig::default(),
            generated_at: None,
        }
    }

    pub fn with_memory(mut self, memory: &'a dyn MemoryView) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_type_sizes(mut self, sizes: &'a dyn TypeSizes) -> Self {
        self.sizes = Some(sizes);
        self
    }

    pub fn with_config(mut self, config: ListingConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the header timestamp instead of reading the clock.
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Write the listing to `out`.
    ///
    /// Returns `Ok(None)` without writing anything when a collaborator is
    /// missing. The only error is a failure of `out` itself.
    pub fn render<W: Write>(&self, out: &mut W) -> Result<Option<ListingStats>> {
        let (Some(arch), Some(memory), Some(sizes)) =
            (self.recognized_architecture(), self.memory, self.sizes)
        else {
            debug!("listing skipped: missing architecture, image or type sizes");
            return Ok(None);
        };
        self.config
            .validate()
            .map_err(|e| crate::log_error!(e, "listing configuration rejected"))?;

        let span = crate::span_trace!("dsm_render", arch = %arch);
        let _guard = span.enter();

        let mut renderer = Renderer {
            program: self.program,
            memory,
            sizes,
            config: &self.config,
            layout: ColumnLayout::compute(self.program),
            functions: FunctionMap::build(self.program.functions()),
            caps: arch.capabilities(),
            stats: ListingStats::default(),
            out,
        };
        debug!(
            longest_address = renderer.layout.longest_address,
            longest_instruction = renderer.layout.longest_instruction,
            "column layout computed"
        );

        renderer
            .write_listing(self.timestamp())
            .map_err(|e| crate::log_error!(e, "listing aborted"))?;

        let stats = renderer.stats;
        info!(
            functions = stats.functions,
            instructions = stats.instructions,
            embedded_ranges = stats.embedded_ranges,
            data_lines = stats.data_lines,
            "listing rendered"
        );
        Ok(Some(stats))
    }

    /// Render into a string; `Ok(None)` when a collaborator is missing.
    pub fn render_to_string(&self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.render(&mut buf)?.is_none() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// `Unknown` counts as no architecture at all.
    fn recognized_architecture(&self) -> Option<Architecture> {
        self.program
            .architecture()
            .filter(|arch| *arch != Architecture::Unknown)
    }

    fn timestamp(&self) -> Option<DateTime<Local>> {
        if !self.config.include_timestamp {
            return None;
        }
        Some(self.generated_at.unwrap_or_else(Local::now))
    }
}

/// Function-start map, rebuilt for every render.
pub(crate) struct FunctionMap<'p> {
    by_start: BTreeMap<u64, &'p Function>,
}

impl<'p> FunctionMap<'p> {
    /// Functions with an undefined start are left out; on duplicate starts the
    /// later function wins.
    pub(crate) fn build(functions: &'p [Function]) -> Self {
        let mut by_start = BTreeMap::new();
        for f in functions {
            if let Some(start) = f.start.get() {
                if let Some(prev) = by_start.insert(start, f) {
                    debug!(
                        address = %f.start,
                        replaced = prev.display_name(),
                        "duplicate function start"
                    );
                }
            }
        }
        Self { by_start }
    }

    pub(crate) fn at(&self, address: u64) -> Option<&'p Function> {
        self.by_start.get(&address).copied()
    }

    /// First function start in `[from, end)`.
    pub(crate) fn next_start(&self, from: u64, end: u64) -> Option<u64> {
        if from >= end {
            return None;
        }
        self.by_start.range(from..end).next().map(|(start, _)| *start)
    }
}

/// Per-render state shared by the code, annotation and data renderers.
pub(crate) struct Renderer<'r, W: Write> {
    pub(crate) program: &'r dyn Program,
    pub(crate) memory: &'r dyn MemoryView,
    pub(crate) sizes: &'r dyn TypeSizes,
    pub(crate) config: &'r ListingConfig,
    pub(crate) layout: ColumnLayout,
    pub(crate) functions: FunctionMap<'r>,
    pub(crate) caps: Capabilities,
    pub(crate) stats: ListingStats,
    pub(crate) out: &'r mut W,
}

impl<W: Write> Renderer<'_, W> {
    fn write_listing(&mut self, timestamp: Option<DateTime<Local>>) -> Result<()> {
        self.header(timestamp)?;
        self.code_pass()?;
        self.data_pass()?;
        self.out.flush()?;
        Ok(())
    }

    fn header(&mut self, timestamp: Option<DateTime<Local>>) -> Result<()> {
        writeln!(self.out, ";;")?;
        for line in &self.config.banner {
            writeln!(self.out, ";; {}", line)?;
        }
        if let Some(ts) = timestamp {
            writeln!(self.out, ";; Copyright (c) {}", ts.year())?;
            writeln!(self.out, ";;")?;
            writeln!(
                self.out,
                ";; Generation date: {}",
                ts.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        writeln!(
            self.out,
            ";; Architecture: {}",
            self.program.architecture_name()
        )?;
        writeln!(self.out, ";;")?;
        Ok(())
    }

    /// Banner opening one of the two passes.
    pub(crate) fn pass_banner(&mut self, title: &str) -> Result<()> {
        write!(self.out, "\n;;\n;; {}\n;;\n\n", title)?;
        Ok(())
    }

    /// Aligned address column followed by the column gap.
    pub(crate) fn address_column(&self, address: u64) -> String {
        self.layout
            .aligned_address(address, &self.config.column_gap)
    }
}
