//! # Instruction Encoding
//!
//! Every IRRE instruction is one 32-bit word, laid out as:
//!
//! ```text
//! [31:24] opcode
//! [23:16] field A (register or imm8)
//! [15:8]  field B (register or imm8)
//! [7:0]   field C (register or imm8)
//! op_imm24 uses bits [23:0]; op_reg_imm16 uses bits [15:0].
//! ```
//!
//! Words are serialized little-endian: byte 0 holds bits [7:0].

use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::opcode::{InstrFormat, Opcode};
use crate::register::Register;
use crate::Word;

// ============================================================================
// Field positions and masks
// ============================================================================

/// Opcode field: bits 24-31
pub const OP_SHIFT: u32 = 24;

/// Field A: bits 16-23
pub const A_SHIFT: u32 = 16;

/// Field B: bits 8-15
pub const B_SHIFT: u32 = 8;

/// 24-bit immediate mask
pub const IMM24_MASK: u32 = 0x00FF_FFFF;

/// 16-bit immediate mask
pub const IMM16_MASK: u32 = 0x0000_FFFF;

/// Single field mask (8 bits)
pub const FIELD_MASK: u32 = 0xFF;

/// Extract the opcode byte from an instruction word
#[inline]
pub const fn extract_op(word: Word) -> u8 {
    ((word >> OP_SHIFT) & FIELD_MASK) as u8
}

/// Extract field A (bits 16-23)
#[inline]
pub const fn extract_a(word: Word) -> u8 {
    ((word >> A_SHIFT) & FIELD_MASK) as u8
}

/// Extract field B (bits 8-15)
#[inline]
pub const fn extract_b(word: Word) -> u8 {
    ((word >> B_SHIFT) & FIELD_MASK) as u8
}

/// Extract field C (bits 0-7)
#[inline]
pub const fn extract_c(word: Word) -> u8 {
    (word & FIELD_MASK) as u8
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode an instruction to its 32-bit word.
///
/// Unused field slots are zero; the 24-bit immediate is masked to 24 bits.
pub fn encode(inst: &Instruction) -> Word {
    match *inst {
        Instruction::Op { op } => (op.to_u8() as Word) << OP_SHIFT,

        Instruction::OpReg { op, a } => {
            ((op.to_u8() as Word) << OP_SHIFT) | ((a.to_u8() as Word) << A_SHIFT)
        }

        Instruction::OpImm24 { op, addr } => {
            ((op.to_u8() as Word) << OP_SHIFT) | (addr & IMM24_MASK)
        }

        Instruction::OpRegImm16 { op, a, imm } => {
            ((op.to_u8() as Word) << OP_SHIFT)
                | ((a.to_u8() as Word) << A_SHIFT)
                | (imm as Word)
        }

        Instruction::OpRegReg { op, a, b } => {
            ((op.to_u8() as Word) << OP_SHIFT)
                | ((a.to_u8() as Word) << A_SHIFT)
                | ((b.to_u8() as Word) << B_SHIFT)
        }

        Instruction::OpRegRegImm8 { op, a, b, imm } => {
            ((op.to_u8() as Word) << OP_SHIFT)
                | ((a.to_u8() as Word) << A_SHIFT)
                | ((b.to_u8() as Word) << B_SHIFT)
                | (imm as Word)
        }

        Instruction::OpRegImm8x2 { op, a, v0, v1 } => {
            ((op.to_u8() as Word) << OP_SHIFT)
                | ((a.to_u8() as Word) << A_SHIFT)
                | ((v0 as Word) << B_SHIFT)
                | (v1 as Word)
        }

        Instruction::OpRegRegReg { op, a, b, c } => {
            ((op.to_u8() as Word) << OP_SHIFT)
                | ((a.to_u8() as Word) << A_SHIFT)
                | ((b.to_u8() as Word) << B_SHIFT)
                | (c.to_u8() as Word)
        }
    }
}

/// Encode to little-endian bytes (byte 0 = bits [7:0])
pub fn encode_bytes(inst: &Instruction) -> [u8; 4] {
    encode(inst).to_le_bytes()
}

/// Encode an instruction sequence to a flat little-endian byte vector
pub fn encode_all(instructions: &[Instruction]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(instructions.len() * 4);
    for inst in instructions {
        bytes.extend_from_slice(&encode_bytes(inst));
    }
    bytes
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_register(byte: u8) -> Result<Register, DecodeError> {
    Register::from_u8(byte).ok_or(DecodeError::InvalidRegister(byte))
}

/// Decode a 32-bit word into an instruction.
///
/// The opcode comes from bits [31:24]; its declared format selects which
/// fields are validated as registers. Operand bytes a format does not use
/// are ignored.
pub fn decode(word: Word) -> Result<Instruction, DecodeError> {
    let op_byte = extract_op(word);
    let op = Opcode::from_u8(op_byte).ok_or(DecodeError::InvalidOpcode(op_byte))?;

    let inst = match op.format() {
        InstrFormat::Op => Instruction::Op { op },

        InstrFormat::OpReg => Instruction::OpReg {
            op,
            a: decode_register(extract_a(word))?,
        },

        InstrFormat::OpImm24 => Instruction::OpImm24 {
            op,
            addr: word & IMM24_MASK,
        },

        InstrFormat::OpRegImm16 => Instruction::OpRegImm16 {
            op,
            a: decode_register(extract_a(word))?,
            imm: (word & IMM16_MASK) as u16,
        },

        InstrFormat::OpRegReg => Instruction::OpRegReg {
            op,
            a: decode_register(extract_a(word))?,
            b: decode_register(extract_b(word))?,
        },

        InstrFormat::OpRegRegImm8 => Instruction::OpRegRegImm8 {
            op,
            a: decode_register(extract_a(word))?,
            b: decode_register(extract_b(word))?,
            imm: extract_c(word),
        },

        InstrFormat::OpRegImm8x2 => Instruction::OpRegImm8x2 {
            op,
            a: decode_register(extract_a(word))?,
            v0: extract_b(word),
            v1: extract_c(word),
        },

        InstrFormat::OpRegRegReg => Instruction::OpRegRegReg {
            op,
            a: decode_register(extract_a(word))?,
            b: decode_register(extract_b(word))?,
            c: decode_register(extract_c(word))?,
        },
    };

    Ok(inst)
}

/// Decode from a little-endian byte slice; requires at least 4 bytes
pub fn decode_bytes(bytes: &[u8]) -> Result<Instruction, DecodeError> {
    if bytes.len() < 4 {
        return Err(DecodeError::Malformed(bytes.len()));
    }
    let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    decode(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_op() {
        assert_eq!(encode(&Instruction::nop()), 0x0000_0000);
        assert_eq!(encode(&Instruction::hlt()), 0xFF00_0000);
        assert_eq!(encode(&Instruction::ret()), 0x2B00_0000);
    }

    #[test]
    fn test_encode_fields() {
        // add r2 r0 r1 -> op=0x01 a=0x02 b=0x00 c=0x01
        let inst = Instruction::add(Register::R2, Register::R0, Register::R1);
        assert_eq!(encode(&inst), 0x0102_0001);

        // set r0 0x2a -> op=0x0b a=0x00 imm=0x002a
        let inst = Instruction::set(Register::R0, 0x2A);
        assert_eq!(encode(&inst), 0x0B00_002A);

        // jmi 0x123456
        let inst = Instruction::jmi(0x0012_3456);
        assert_eq!(encode(&inst), 0x2012_3456);
    }

    #[test]
    fn test_imm24_masked() {
        let inst = Instruction::jmi(0xFF12_3456);
        assert_eq!(encode(&inst) & IMM24_MASK, 0x0012_3456);
        assert_eq!(extract_op(encode(&inst)), 0x20);
    }

    #[test]
    fn test_encode_bytes_little_endian() {
        let inst = Instruction::set(Register::R1, 0x1234);
        let word = encode(&inst);
        let bytes = encode_bytes(&inst);
        for k in 0..4 {
            assert_eq!(bytes[k], ((word >> (8 * k)) & 0xFF) as u8);
        }
        assert_eq!(bytes, [0x34, 0x12, 0x01, 0x0B]);
    }

    #[test]
    fn test_decode_invalid_opcode() {
        assert_eq!(decode(0x1100_0000), Err(DecodeError::InvalidOpcode(0x11)));
        assert_eq!(decode(0xFE00_0000), Err(DecodeError::InvalidOpcode(0xFE)));
    }

    #[test]
    fn test_decode_invalid_register() {
        // mov with a = 0x30 (out of range)
        let word = 0x0C30_0000;
        assert_eq!(decode(word), Err(DecodeError::InvalidRegister(0x30)));

        // add with c = 0x25
        let word = 0x0100_0025;
        assert_eq!(decode(word), Err(DecodeError::InvalidRegister(0x25)));
    }

    #[test]
    fn test_decode_bytes_short_input() {
        assert_eq!(decode_bytes(&[0x00]), Err(DecodeError::Malformed(1)));
        assert_eq!(decode_bytes(&[]), Err(DecodeError::Malformed(0)));
    }

    #[test]
    fn test_roundtrip_representatives() {
        let cases = [
            Instruction::nop(),
            Instruction::hlt(),
            Instruction::ret(),
            Instruction::jmp(Register::R31),
            Instruction::cal(Register::R5),
            Instruction::jmi(0xABCDEF),
            Instruction::int(0x42),
            Instruction::set(Register::Sp, 0xFFFF),
            Instruction::sup(Register::R7, 0x8000),
            Instruction::mov(Register::At, Register::Ad),
            Instruction::not(Register::R1, Register::R2),
            Instruction::sxt(Register::R3, Register::R4),
            Instruction::ldw(Register::R0, Register::Sp, 0xFC),
            Instruction::stw(Register::R1, Register::Sp, 4),
            Instruction::ldb(Register::R2, Register::R3, 1),
            Instruction::stb(Register::R4, Register::R5, 0),
            Instruction::bve(Register::Ad, Register::R0, 1),
            Instruction::bvn(Register::Ad, Register::R1, 0),
            Instruction::seq(Register::R0, Register::R1, 9),
            Instruction::sia(Register::R6, 0x10, 2),
            Instruction::add(Register::R0, Register::R1, Register::R2),
            Instruction::snd(Register::R0, Register::R1, Register::R2),
        ];
        for inst in cases {
            let word = encode(&inst);
            let back = decode(word).unwrap();
            assert_eq!(back, inst, "roundtrip failed for {}", inst);
            assert_eq!(encode(&back), word);
        }
    }

    #[test]
    fn test_decode_bytes_roundtrip() {
        let inst = Instruction::bvn(Register::Ad, Register::R9, 0);
        let bytes = encode_bytes(&inst);
        assert_eq!(decode_bytes(&bytes).unwrap(), inst);
    }

    #[test]
    fn test_encode_all() {
        let seq = [Instruction::nop(), Instruction::hlt()];
        let bytes = encode_all(&seq);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0xFF]);
    }
}
