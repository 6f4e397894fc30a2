//! Disassembler integration: listings from assembled objects

use irre_disassembler::{Disassembler, ListingFormat};
use irre_spec::encoding::encode_all;
use irre_spec::{Instruction, ObjectFile, Register};

#[test]
fn listing_covers_every_format() {
    let code = encode_all(&[
        Instruction::nop(),
        Instruction::jmp(Register::R3),
        Instruction::jmi(0x000010),
        Instruction::set(Register::R0, 0xBEEF),
        Instruction::mov(Register::R1, Register::R2),
        Instruction::ldw(Register::R4, Register::Sp, 0x08),
        Instruction::sia(Register::R5, 0x01, 0x02),
        Instruction::snd(Register::R0, Register::R1, Register::R2),
        Instruction::hlt(),
    ]);

    let listing = Disassembler::new()
        .disassemble_bytes(&code, ListingFormat::Basic)
        .unwrap();
    let lines: Vec<&str> = listing.lines().collect();

    assert_eq!(
        lines,
        vec![
            "nop",
            "jmp r3",
            "jmi 0x000010",
            "set r0 0xbeef",
            "mov r1 r2",
            "ldw r4 sp 0x08",
            "sia r5 0x01 0x02",
            "snd r0 r1 r2",
            "hlt",
        ]
    );
}

#[test]
fn annotated_object_listing_shape() {
    let obj = ObjectFile {
        entry_offset: 0,
        code: encode_all(&[
            Instruction::set(Register::R0, 0x2A),
            Instruction::hlt(),
        ]),
        data: (0u8..20).collect(),
    };

    let listing = Disassembler::new()
        .disassemble_object(&obj, ListingFormat::Annotated)
        .unwrap();

    assert!(listing.starts_with("; irre object file disassembly\n"));
    assert!(listing.contains("; code size: 8 bytes (2 instructions)"));
    assert!(listing.contains("0x0000: 2a000b00  set r0 0x002a"));
    assert!(listing.contains("0x0004: 000000ff  hlt"));

    // data dump: 16 bytes, then 4 on the second line
    assert!(listing.contains("0x0008: 000102030405060708090a0b0c0d0e0f"));
    assert!(listing.contains("0x0018: 10111213"));
}

#[test]
fn malformed_words_do_not_abort() {
    let mut code = Vec::new();
    code.extend_from_slice(&0xFE00_0000u32.to_le_bytes()); // bad opcode
    code.extend_from_slice(&0x0C99_0000u32.to_le_bytes()); // bad register
    code.extend_from_slice(&encode_all(&[Instruction::hlt()]));

    let listing = Disassembler::new()
        .disassemble_bytes(&code, ListingFormat::Basic)
        .unwrap();
    let lines: Vec<&str> = listing.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("; ERROR: invalid opcode 0xfe"));
    assert!(lines[1].starts_with("; ERROR: invalid register 0x99"));
    assert_eq!(lines[2], "hlt");
}

#[test]
fn basic_format_omits_columns_and_headers() {
    let obj = ObjectFile {
        entry_offset: 0,
        code: encode_all(&[Instruction::hlt()]),
        data: vec![0xAA],
    };
    let listing = Disassembler::new()
        .disassemble_object(&obj, ListingFormat::Basic)
        .unwrap();
    assert_eq!(listing, "hlt");
}
