use crate::core::disassembler::{
    Architecture, Disassembler, DisassemblerError, DisassemblerResult, Endianness,
};
use crate::core::instruction::{BranchTargets, ControlFlow, Instruction, Operand};
use capstone::{Arch, Capstone, Endian, Mode, NO_EXTRA_MODE};

pub struct CapstoneDisassembler {
    cs: Capstone,
    arch: Architecture,
    endianness: Endianness,
}

fn cs_endian(end: Endianness) -> Option<Endian> {
    Some(match end {
        Endianness::Big => Endian::Big,
        Endianness::Little => Endian::Little,
    })
}

fn cs_arch_mode(arch: Architecture, end: Endianness) -> Option<(Arch, Mode, Option<Endian>)> {
    match arch {
        Architecture::ARM => Some((Arch::ARM, Mode::Arm, cs_endian(end))),
        Architecture::ARM64 => Some((Arch::ARM64, Mode::Arm, cs_endian(end))),
        Architecture::MIPS => Some((Arch::MIPS, Mode::Mips32, cs_endian(end))),
        Architecture::MIPS64 => Some((Arch::MIPS, Mode::Mips64, cs_endian(end))),
        // PIC32 is a little-endian MIPS32 core
        Architecture::PIC32 => Some((Arch::MIPS, Mode::Mips32, Some(Endian::Little))),
        Architecture::PPC => Some((Arch::PPC, Mode::Mode32, cs_endian(end))),
        Architecture::PPC64 => Some((Arch::PPC, Mode::Mode64, cs_endian(end))),
        Architecture::RISCV => Some((Arch::RISCV, Mode::RiscV32, None)),
        Architecture::RISCV64 => Some((Arch::RISCV, Mode::RiscV64, None)),
        Architecture::X86 | Architecture::X86_64 | Architecture::Unknown => None,
    }
}

/// Transfer kind of a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    None,
    Call,
    Jump,
    ConditionalJump,
}

fn classify_mnemonic(mnemonic: &str, arch: Architecture) -> Transfer {
    let m = mnemonic.to_ascii_lowercase();
    match arch {
        Architecture::ARM | Architecture::ARM64 => match m.as_str() {
            "ret" => Transfer::None,
            "bl" | "blr" | "blx" => Transfer::Call,
            "b" | "br" | "bx" => Transfer::Jump,
            "cbz" | "cbnz" | "tbz" | "tbnz" => Transfer::ConditionalJump,
            _ if m.starts_with("b.") => Transfer::ConditionalJump,
            // ARM condition-code suffixes: beq, bne, bgt, ...
            _ if m.len() == 3 && m.starts_with('b') && !matches!(m.as_str(), "bic" | "bfi" | "bfc") => {
                Transfer::ConditionalJump
            }
            _ => Transfer::None,
        },
        Architecture::MIPS | Architecture::MIPS64 | Architecture::PIC32 => match m.as_str() {
            "jal" | "jalr" | "bal" | "jalx" => Transfer::Call,
            "j" | "jr" | "b" => Transfer::Jump,
            "break" => Transfer::None,
            _ if m.starts_with('b') => Transfer::ConditionalJump,
            _ => Transfer::None,
        },
        Architecture::RISCV | Architecture::RISCV64 => match m.as_str() {
            "jal" | "jalr" | "call" => Transfer::Call,
            "j" | "jr" => Transfer::Jump,
            _ if m.starts_with('b') => Transfer::ConditionalJump,
            _ => Transfer::None,
        },
        Architecture::PPC | Architecture::PPC64 => match m.as_str() {
            "bl" | "bla" | "bctrl" => Transfer::Call,
            "b" | "ba" | "bctr" => Transfer::Jump,
            "blr" => Transfer::None,
            _ if m.starts_with('b') => Transfer::ConditionalJump,
            _ => Transfer::None,
        },
        _ => Transfer::None,
    }
}

fn parse_int(token: &str) -> Option<i64> {
    let t = token.trim().trim_start_matches('#');
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let value = match t.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => t.parse::<i64>().ok()?,
    };
    Some(if negative { -value } else { value })
}

/// Direct target: the last operand when it is a plain number.
fn direct_target(op_str: &str) -> Option<u64> {
    op_str
        .rsplit(',')
        .next()
        .and_then(parse_int)
        .map(|v| v as u64)
}

/// Structured operands recovered from capstone's operand text.
fn parse_operands(op_str: &str) -> Vec<Operand> {
    let mut out = Vec::new();
    let mut rest = op_str;
    while !rest.trim().is_empty() {
        // Commas inside brackets belong to one memory operand.
        let split = match rest.find('[') {
            Some(l) if rest.find(',').is_some_and(|c| c > l) => rest[l..]
                .find(']')
                .map(|r| l + r + 1)
                .and_then(|after| rest[after..].find(',').map(|c| after + c)),
            _ => rest.find(','),
        };
        let (tok, tail) = match split {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        rest = tail;
        let tok = tok.trim().to_ascii_lowercase();

        if let (Some(l), Some(r)) = (tok.find('['), tok.find(']')) {
            // [base, #disp]
            let mut parts = tok[l + 1..r].split(',').map(str::trim);
            let base = parts.next().filter(|p| !p.is_empty()).map(str::to_string);
            let disp = parts.next().and_then(parse_int).unwrap_or(0);
            out.push(Operand::memory(disp, base, None, 1, None));
        } else if let (Some(l), Some(r)) = (tok.find('('), tok.find(')')) {
            // disp(base)
            let base = Some(tok[l + 1..r].trim().to_string()).filter(|b| !b.is_empty());
            let disp = parse_int(&tok[..l]).unwrap_or(0);
            out.push(Operand::memory(disp, base, None, 1, None));
        } else if let Some(v) = parse_int(&tok) {
            out.push(Operand::immediate(v));
        } else {
            out.push(Operand::register(tok));
        }
    }
    out
}

impl CapstoneDisassembler {
    pub fn new(arch: Architecture, endianness: Endianness) -> Option<Self> {
        let (a, m, endian) = cs_arch_mode(arch, endianness)?;
        let mut cs = Capstone::new_raw(a, m, NO_EXTRA_MODE, endian).ok()?;
        // Details carry the instruction groups used for call/jump detection.
        let _ = cs.set_detail(true);
        Some(Self {
            cs,
            arch,
            endianness,
        })
    }

    fn group_transfer(&self, insn: &capstone::Insn) -> Transfer {
        let Ok(detail) = self.cs.insn_detail(insn) else {
            return Transfer::None;
        };
        let groups: Vec<String> = detail
            .groups()
            .iter()
            .filter_map(|g| self.cs.group_name(*g))
            .collect();
        if groups.iter().any(|g| g == "call") {
            Transfer::Call
        } else if groups.iter().any(|g| g == "jump") {
            Transfer::Jump
        } else {
            Transfer::None
        }
    }

    fn control_flow(&self, insn: &capstone::Insn, size: u64) -> ControlFlow {
        let mnemonic = insn.mnemonic().unwrap_or("");
        let op_str = insn.op_str().unwrap_or("");
        let by_name = classify_mnemonic(mnemonic, self.arch);
        let transfer = match (by_name, self.group_transfer(insn)) {
            // Groups do not distinguish conditional jumps.
            (Transfer::None, from_groups) => from_groups,
            (named, _) => named,
        };
        let target = direct_target(op_str);
        match transfer {
            Transfer::None => ControlFlow::Sequential,
            Transfer::Call => ControlFlow::Call { callee: target },
            Transfer::Jump => ControlFlow::Branch(BranchTargets::unconditional(target)),
            Transfer::ConditionalJump => ControlFlow::Branch(BranchTargets::conditional(
                target,
                Some(insn.address().wrapping_add(size)),
            )),
        }
    }
}

impl Disassembler for CapstoneDisassembler {
    fn decode(&self, address: u64, bytes: &[u8]) -> DisassemblerResult<Instruction> {
        if bytes.is_empty() {
            return Err(DisassemblerError::InsufficientBytes);
        }
        let insns = self
            .cs
            .disasm_count(bytes, address, 1)
            .map_err(|e| DisassemblerError::InternalError(e.to_string()))?;
        let insn = insns
            .iter()
            .next()
            .ok_or(DisassemblerError::InvalidInstruction)?;

        let size = insn.len() as u64;
        let mnemonic = insn.mnemonic().unwrap_or("");
        let op_str = insn.op_str().unwrap_or("");
        let text = if op_str.is_empty() {
            mnemonic.to_string()
        } else {
            format!("{} {}", mnemonic, op_str)
        };

        Ok(Instruction::new(address, size as u32, text)
            .with_flow(self.control_flow(&insn, size))
            .with_operands(parse_operands(op_str)))
    }

    fn max_instruction_length(&self) -> usize {
        match self.arch {
            Architecture::MIPS | Architecture::MIPS64 | Architecture::PIC32 => 4,
            Architecture::ARM64 | Architecture::PPC | Architecture::PPC64 => 4,
            _ => 8,
        }
    }

    fn architecture(&self) -> Architecture {
        self.arch
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn name(&self) -> &str {
        "capstone"
    }
}
