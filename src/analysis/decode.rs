//! Linear-sweep decoding of loaded function bodies into a [`ProgramView`].

use tracing::{debug, trace};

use crate::analysis::loader::LoadedBinary;
use crate::analysis::memory::MemoryView;
use crate::analysis::view::ProgramView;
use crate::core::disassembler::Disassembler;
use crate::core::instruction::{BranchTargets, ControlFlow, Instruction};
use crate::disasm::registry;
use crate::error::{DsmError, Result};

/// Decode every function of `binary` with the default backend for its
/// architecture.
pub fn decode_program(binary: &LoadedBinary) -> Result<ProgramView> {
    let backend = registry::for_arch(binary.architecture, binary.endianness)
        .ok_or_else(|| DsmError::UnsupportedArchitecture(binary.architecture.to_string()))?;
    Ok(decode_with(binary, &backend))
}

/// Decode every function of `binary` with `decoder`.
///
/// Bytes that do not decode are skipped one at a time; they show up as
/// embedded data in the listing. On delay-slot architectures each control
/// transfer is attributed to the instruction in its delay slot.
pub fn decode_with(binary: &LoadedBinary, decoder: &dyn Disassembler) -> ProgramView {
    let mut view = ProgramView::new(binary.architecture);
    for segment in &binary.segments {
        view.add_segment(segment.clone());
    }
    for global in &binary.globals {
        view.add_global(global.clone());
    }

    let delay_slots = binary.architecture.capabilities().delay_slot;
    for function in &binary.functions {
        view.add_function(function.clone());
        let (Some(start), Some(end)) = (function.start.get(), function.end.get()) else {
            continue;
        };
        let mut body = sweep(&binary.image, decoder, start, end);
        if delay_slots {
            attribute_to_delay_slots(&mut body);
        }
        trace!(function = function.display_name(), instructions = body.len(), "decoded");
        for insn in body {
            view.add_instruction(insn);
        }
    }

    debug!(
        decoder = decoder.name(),
        functions = binary.functions.len(),
        instructions = view.instruction_count(),
        "program decoded"
    );
    view
}

/// Decode `[start, end)` front to back.
fn sweep(image: &dyn MemoryView, decoder: &dyn Disassembler, start: u64, end: u64) -> Vec<Instruction> {
    let max_len = decoder.max_instruction_length().max(1);
    let mut out = Vec::new();
    let mut skipped = 0usize;
    let mut addr = start;
    while addr < end {
        let len = max_len.min((end - addr) as usize);
        let bytes: Vec<u8> = image
            .read_bytes(addr, len)
            .into_iter()
            .map_while(|b| b.ok())
            .collect();
        let decoded = if bytes.is_empty() {
            None
        } else {
            decoder.decode(addr, &bytes).ok().filter(|insn| insn.size > 0)
        };
        match decoded {
            Some(insn) => {
                addr = insn.end_address();
                out.push(insn);
            }
            None => {
                skipped += 1;
                addr += 1;
            }
        }
    }
    if skipped > 0 {
        trace!(start, end, skipped, "undecodable bytes skipped");
    }
    out
}

/// Move each control transfer onto the following instruction.
fn attribute_to_delay_slots(body: &mut [Instruction]) {
    let mut flows = vec![ControlFlow::Sequential; body.len()];
    for (i, insn) in body.iter().enumerate() {
        if !insn.flow.is_transfer() {
            continue;
        }
        match body.get(i + 1) {
            Some(slot) => flows[i + 1] = retarget_fallthrough(insn.flow, slot),
            // No delay slot decoded; the transfer stays where it is.
            None => flows[i] = insn.flow,
        }
    }
    for (insn, flow) in body.iter_mut().zip(flows) {
        insn.flow = flow;
    }
}

/// Not-taken paths continue after the delay slot.
fn retarget_fallthrough(flow: ControlFlow, slot: &Instruction) -> ControlFlow {
    match flow {
        ControlFlow::Branch(BranchTargets {
            conditional: true,
            taken,
            ..
        }) => ControlFlow::Branch(BranchTargets::conditional(taken, Some(slot.end_address()))),
        other => other,
    }
}
