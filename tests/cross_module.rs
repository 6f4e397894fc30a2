//! Cross-crate invariants: codec, object container, and the
//! assemble/disassemble round trip.

use irre_assembler::assemble;
use irre_disassembler::{Disassembler, ListingFormat};
use irre_spec::encoding::{decode, encode};
use irre_spec::{InstrFormat, Instruction, ObjectFile, Opcode, Register};

fn representative(op: Opcode) -> Instruction {
    let a = Register::R1;
    let b = Register::R20;
    let c = Register::At;
    match op.format() {
        InstrFormat::Op => Instruction::Op { op },
        InstrFormat::OpReg => Instruction::OpReg { op, a },
        InstrFormat::OpImm24 => Instruction::OpImm24 { op, addr: 0x123456 },
        InstrFormat::OpRegImm16 => Instruction::OpRegImm16 { op, a, imm: 0x7FFF },
        InstrFormat::OpRegReg => Instruction::OpRegReg { op, a, b },
        InstrFormat::OpRegRegImm8 => Instruction::OpRegRegImm8 { op, a, b, imm: 0x42 },
        InstrFormat::OpRegImm8x2 => Instruction::OpRegImm8x2 {
            op,
            a,
            v0: 0x05,
            v1: 0x02,
        },
        InstrFormat::OpRegRegReg => Instruction::OpRegRegReg { op, a, b, c },
    }
}

#[test]
fn listing_reassembles_to_identical_bytes() {
    // assemble -> disassemble (basic) -> assemble must reproduce the
    // code section byte for byte
    let source = r#"
        %entry: main
        main:
            set r0 42
            set r1 $ff
            sup r1 $8000
            add r2 r0 r1
            tcu r3 r2 r0
            seq r4 r3 1
            ldw r5 sp 4
            stw r5 sp 8
            sia r6 3 2
            jmi main
            hlt
    "#;
    let first = assemble(source).unwrap();
    let listing = Disassembler::new()
        .disassemble_bytes(&first.code, ListingFormat::Basic)
        .unwrap();
    let second = assemble(&listing).unwrap();
    assert_eq!(first.code, second.code);
}

#[test]
fn every_opcode_survives_the_text_round_trip() {
    for op in Opcode::ALL {
        let inst = representative(op);
        let listing = inst.to_string();
        let obj = assemble(&listing)
            .unwrap_or_else(|e| panic!("'{listing}' failed to assemble: {e}"));
        assert_eq!(
            obj.code,
            encode(&inst).to_le_bytes().to_vec(),
            "text round trip changed encoding of '{listing}'"
        );
    }
}

#[test]
fn word_round_trip_through_codec() {
    for op in Opcode::ALL {
        let inst = representative(op);
        let word = encode(&inst);
        assert_eq!(encode(&decode(word).unwrap()), word);
    }
}

#[test]
fn object_container_round_trip_from_assembled_program() {
    let source = "%entry: go\nnop\ngo:\nset r0 1\nhlt\n%d \"payload\" 7\n";
    let obj = assemble(source).unwrap();
    let reparsed = ObjectFile::from_binary(&obj.to_binary()).unwrap();
    assert_eq!(reparsed, obj);
    assert_eq!(reparsed.entry_offset, 4);
    assert_eq!(&reparsed.data[0..7], b"payload");
}

#[test]
fn disassembler_and_codec_agree_on_hex_columns() {
    let inst = Instruction::set(Register::R0, 0x2A);
    let word = encode(&inst);
    let listing = Disassembler::new()
        .disassemble_bytes(&word.to_le_bytes(), ListingFormat::Annotated)
        .unwrap();
    // hex column shows file byte order
    assert!(listing.contains("2a000b00"));
    assert!(listing.contains("set r0 0x002a"));
}

#[test]
fn data_sections_never_interleave_with_code() {
    let source = "nop\n%d 1\nnop\n%d 2\nhlt\n";
    let obj = assemble(source).unwrap();
    assert_eq!(obj.code.len(), 12);
    assert_eq!(obj.data, vec![1, 0, 0, 0, 2, 0, 0, 0]);
}
