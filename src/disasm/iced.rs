use crate::core::disassembler::{
    Architecture, Disassembler, DisassemblerError, DisassemblerResult, Endianness,
};
use crate::core::instruction::{BranchTargets, ControlFlow, Instruction, Operand};
use iced_x86::{
    Decoder, DecoderOptions, FlowControl, Formatter, IntelFormatter, OpKind, Register as IReg,
};

pub struct IcedDisassembler {
    bits: u32,
    arch: Architecture,
    endianness: Endianness,
}

fn register_name(reg: IReg) -> Option<String> {
    (reg != IReg::None).then(|| format!("{:?}", reg).to_ascii_lowercase())
}

impl IcedDisassembler {
    pub fn new(arch: Architecture, endianness: Endianness) -> Self {
        let bits = match arch {
            Architecture::X86 => 32,
            _ => 64,
        };
        Self {
            bits,
            arch,
            endianness,
        }
    }

    /// Intel syntax with `0x` hex and `, ` between operands.
    fn formatter() -> IntelFormatter {
        let mut fmt = IntelFormatter::new();
        let options = fmt.options_mut();
        options.set_hex_prefix("0x");
        options.set_hex_suffix("");
        options.set_uppercase_hex(false);
        options.set_space_after_operand_separator(true);
        fmt
    }

    fn operands(instr: &iced_x86::Instruction) -> Vec<Operand> {
        let mut out = Vec::new();
        for i in 0..instr.op_count() {
            let op = match instr.op_kind(i) {
                OpKind::Register => Operand::register(
                    register_name(instr.op_register(i)).unwrap_or_default(),
                ),
                OpKind::Memory => Operand::memory(
                    instr.memory_displacement64() as i64,
                    register_name(instr.memory_base()),
                    register_name(instr.memory_index()),
                    instr.memory_index_scale() as u8,
                    // Only an explicit override counts; the default segment is implied.
                    register_name(instr.segment_prefix()),
                ),
                OpKind::Immediate8
                | OpKind::Immediate8_2nd
                | OpKind::Immediate16
                | OpKind::Immediate32
                | OpKind::Immediate64
                | OpKind::Immediate8to16
                | OpKind::Immediate8to32
                | OpKind::Immediate8to64
                | OpKind::Immediate32to64 => Operand::immediate(instr.immediate(i) as i64),
                OpKind::NearBranch16 | OpKind::NearBranch32 | OpKind::NearBranch64 => {
                    Operand::immediate(instr.near_branch_target() as i64)
                }
                _ => Operand::other(),
            };
            out.push(op);
        }
        out
    }

    fn control_flow(instr: &iced_x86::Instruction) -> ControlFlow {
        let near_target = matches!(
            instr.op0_kind(),
            OpKind::NearBranch16 | OpKind::NearBranch32 | OpKind::NearBranch64
        )
        .then(|| instr.near_branch_target());
        match instr.flow_control() {
            FlowControl::Call => ControlFlow::Call {
                callee: near_target,
            },
            FlowControl::IndirectCall => ControlFlow::Call { callee: None },
            FlowControl::UnconditionalBranch => {
                ControlFlow::Branch(BranchTargets::unconditional(near_target))
            }
            FlowControl::IndirectBranch => ControlFlow::Branch(BranchTargets::unconditional(None)),
            FlowControl::ConditionalBranch => ControlFlow::Branch(BranchTargets::conditional(
                near_target,
                Some(instr.next_ip()),
            )),
            _ => ControlFlow::Sequential,
        }
    }
}

impl Disassembler for IcedDisassembler {
    fn decode(&self, address: u64, bytes: &[u8]) -> DisassemblerResult<Instruction> {
        if !self.arch.is_x86() {
            return Err(DisassemblerError::UnsupportedArchitecture);
        }
        if bytes.is_empty() {
            return Err(DisassemblerError::InsufficientBytes);
        }
        let mut decoder = Decoder::with_ip(self.bits, bytes, address, DecoderOptions::NONE);
        let instr = decoder.decode();
        if instr.is_invalid() {
            return Err(DisassemblerError::InvalidInstruction);
        }

        let mut text = String::new();
        Self::formatter().format(&instr, &mut text);

        Ok(Instruction::new(address, instr.len() as u32, text)
            .with_flow(Self::control_flow(&instr))
            .with_operands(Self::operands(&instr)))
    }

    fn max_instruction_length(&self) -> usize {
        15
    }

    fn architecture(&self) -> Architecture {
        self.arch
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn name(&self) -> &str {
        "iced-x86"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instruction::OperandKind;

    fn x86() -> IcedDisassembler {
        IcedDisassembler::new(Architecture::X86, Endianness::Little)
    }

    #[test]
    fn test_push_immediate() {
        let insn = x86().decode(0x1000, &[0x68, 0x00, 0x30, 0x00, 0x00]).unwrap();
        assert_eq!(insn.size, 5);
        assert!(insn.text.starts_with("push"));
        assert!(insn.text.ends_with("0x3000"));
        assert_eq!(insn.operands[0].literal_address(), Some(0x3000));
        assert_eq!(insn.flow, ControlFlow::Sequential);
    }

    #[test]
    fn test_absolute_memory_operand() {
        // mov eax, [0x3010]
        let insn = x86().decode(0x1000, &[0xa1, 0x10, 0x30, 0x00, 0x00]).unwrap();
        let mem = insn
            .operands
            .iter()
            .find(|op| op.kind == OperandKind::Memory)
            .unwrap();
        assert!(mem.is_absolute_memory());
        assert_eq!(mem.literal_address(), Some(0x3010));
    }

    #[test]
    fn test_based_memory_is_not_literal() {
        // mov eax, [ebx-4]
        let insn = x86().decode(0x1000, &[0x8b, 0x43, 0xfc]).unwrap();
        assert!(insn.operands.iter().all(|op| op.literal_address().is_none()));
    }

    #[test]
    fn test_call_and_branches() {
        // call rel32 to 0x2000 from 0x1000
        let call = x86().decode(0x1000, &[0xe8, 0xfb, 0x0f, 0x00, 0x00]).unwrap();
        assert_eq!(call.flow, ControlFlow::Call { callee: Some(0x2000) });

        // jmp short +0
        let jmp = x86().decode(0x1000, &[0xeb, 0x00]).unwrap();
        assert_eq!(
            jmp.flow,
            ControlFlow::Branch(BranchTargets::unconditional(Some(0x1002)))
        );

        // jne short -2 (to itself)
        let jne = x86().decode(0x1000, &[0x75, 0xfe]).unwrap();
        assert_eq!(
            jne.flow,
            ControlFlow::Branch(BranchTargets::conditional(Some(0x1000), Some(0x1002)))
        );

        // call eax
        let indirect = x86().decode(0x1000, &[0xff, 0xd0]).unwrap();
        assert_eq!(indirect.flow, ControlFlow::Call { callee: None });
    }

    #[test]
    fn test_invalid_and_unsupported() {
        assert_eq!(
            x86().decode(0x1000, &[0x0f, 0x0b, 0x00][..1]),
            Err(DisassemblerError::InvalidInstruction)
        );
        assert_eq!(x86().decode(0x1000, &[]), Err(DisassemblerError::InsufficientBytes));
        let arm = IcedDisassembler::new(Architecture::ARM, Endianness::Little);
        assert_eq!(
            arm.decode(0, &[0x90]),
            Err(DisassemblerError::UnsupportedArchitecture)
        );
    }
}
