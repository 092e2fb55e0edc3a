use dsmwriter::core::disassembler::{Architecture, Disassembler, Endianness};
use dsmwriter::core::instruction::ControlFlow;
use dsmwriter::disasm::registry::{for_arch, for_arch_with, BackendKind};

#[test]
fn decode_x86_64_minimal() {
    // xor rax, rax; ret
    let bytes: [u8; 4] = [0x48, 0x31, 0xC0, 0xC3];
    let backend = for_arch(Architecture::X86_64, Endianness::Little).expect("backend");
    let ins1 = backend.decode(0x401000, &bytes).expect("insn");
    assert!(ins1.text.starts_with("xor"));
    assert_eq!(ins1.size, 3);
    assert_eq!(ins1.flow, ControlFlow::Sequential);
    let ins2 = backend.decode(0x401003, &bytes[3..]).expect("insn2");
    assert!(ins2.text.contains("ret"));
    assert_eq!(ins2.end_address(), 0x401004);
}

#[test]
fn decode_arm64_minimal() {
    // mov x0, #1; ret
    let bytes: [u8; 8] = [0x20, 0x00, 0x80, 0xD2, 0xC0, 0x03, 0x5F, 0xD6];
    let backend = for_arch(Architecture::ARM64, Endianness::Little).expect("backend");
    let ins1 = backend.decode(0x1000, &bytes).expect("arm64 insn1");
    assert!(ins1.text.contains("mov"));
    assert_eq!(ins1.size, 4);
    let ins2 = backend.decode(0x1004, &bytes[4..]).expect("arm64 insn2");
    assert!(ins2.text.contains("ret"));
}

#[test]
fn decode_x86_call_target() {
    // call +0 (e8 00 00 00 00) at 0x1000 targets 0x1005
    let bytes: [u8; 5] = [0xe8, 0, 0, 0, 0];
    let backend = for_arch(Architecture::X86, Endianness::Little).expect("backend");
    let insn = backend.decode(0x1000, &bytes).expect("call");
    assert_eq!(insn.flow, ControlFlow::Call { callee: Some(0x1005) });
}

#[test]
fn iced_rejects_arm64() {
    let res = for_arch_with(Architecture::ARM64, Endianness::Little, Some(BackendKind::Iced));
    assert!(res.is_err(), "iced should not support ARM64");
}
