//! Operand validation and pseudo-instruction expansion
//!
//! Each parsed instruction is matched against the pseudo-instruction
//! set first; real mnemonics are then shape-checked against their
//! opcode's format before an assembly item is emitted. Problems are
//! collected into the parse state rather than aborting, so the first
//! error is reported at its true source location.

use crate::item::{Operand, ParseState, SourceLoc, ValidationErrorKind};
use irre_spec::{InstrFormat, Instruction, Opcode, Register};

/// A raw operand as it appears in source, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOperand {
    /// Register name or label reference
    Ident(String),
    /// Numeric literal (32-bit two's-complement carrier)
    Num(u32),
}

/// Parse a canonical register name (`r0`..`r31`, `pc`, `lr`, `ad`, `at`, `sp`)
pub fn parse_register(name: &str) -> Option<Register> {
    name.parse().ok()
}

fn as_register(operand: &RawOperand) -> Option<Register> {
    match operand {
        RawOperand::Ident(name) => parse_register(name),
        RawOperand::Num(_) => None,
    }
}

fn is_immediate(operand: &RawOperand) -> bool {
    matches!(operand, RawOperand::Num(_))
}

/// Immediate fits an N-bit field when it is in the unsigned range
/// [0, 2^N - 1] or is the 32-bit two's-complement form of a negative
/// that fits N bits.
pub fn validate_immediate_range(value: u32, bits: u32) -> Result<(), String> {
    let max_unsigned = (1u32 << bits) - 1;
    if value <= max_unsigned {
        return Ok(());
    }

    let min_negative = u32::MAX - ((1u32 << (bits - 1)) - 1);
    if value >= min_negative {
        return Ok(());
    }

    Err(format!(
        "immediate value {} exceeds {}-bit range (valid: -{} to {})",
        value as i32,
        bits,
        1u32 << (bits - 1),
        max_unsigned
    ))
}

/// Is this mnemonic a pseudo-instruction the assembler rewrites?
pub fn is_pseudo(mnemonic: &str) -> bool {
    matches!(mnemonic, "adi" | "sbi" | "bif")
}

/// Expand a pseudo-instruction into real (mnemonic, operands) pairs.
///
/// - `adi rA rB imm` -> `set at imm; add rA rB at`
/// - `sbi rA rB imm` -> `set at imm; sub rA rB at`
/// - `bif r ADDR v`  -> `set ad ADDR; bve ad r v`
///
/// Returns `None` when the operand count does not match.
pub fn expand_pseudo(
    mnemonic: &str,
    operands: &[RawOperand],
) -> Option<Vec<(&'static str, Vec<RawOperand>)>> {
    let at = RawOperand::Ident("at".to_string());
    let ad = RawOperand::Ident("ad".to_string());

    match mnemonic {
        "adi" if operands.len() == 3 => Some(vec![
            ("set", vec![at.clone(), operands[2].clone()]),
            ("add", vec![operands[0].clone(), operands[1].clone(), at]),
        ]),
        "sbi" if operands.len() == 3 => Some(vec![
            ("set", vec![at.clone(), operands[2].clone()]),
            ("sub", vec![operands[0].clone(), operands[1].clone(), at]),
        ]),
        "bif" if operands.len() == 3 => Some(vec![
            ("set", vec![ad.clone(), operands[1].clone()]),
            ("bve", vec![ad, operands[0].clone(), operands[2].clone()]),
        ]),
        _ => None,
    }
}

fn check_count(
    state: &mut ParseState,
    op: Opcode,
    operands: &[RawOperand],
    expected: usize,
    loc: SourceLoc,
) -> bool {
    if operands.len() != expected {
        state.add_error(
            ValidationErrorKind::OperandCountMismatch,
            format!(
                "instruction '{}' expects {} operand{}, got {}",
                op.mnemonic(),
                expected,
                if expected == 1 { "" } else { "s" },
                operands.len()
            ),
            loc,
        );
        return false;
    }
    true
}

fn check_register(
    state: &mut ParseState,
    op: Opcode,
    operand: &RawOperand,
    which: &str,
    loc: SourceLoc,
) -> bool {
    if as_register(operand).is_some() {
        return true;
    }
    state.add_error(
        ValidationErrorKind::OperandTypeMismatch,
        format!(
            "instruction '{}' {} operand must be a register",
            op.mnemonic(),
            which
        ),
        loc,
    );
    false
}

fn check_immediate(
    state: &mut ParseState,
    operand: &RawOperand,
    bits: u32,
    loc: SourceLoc,
) -> bool {
    if let RawOperand::Num(value) = operand {
        if let Err(message) = validate_immediate_range(*value, bits) {
            state.add_error(ValidationErrorKind::ImmediateOutOfRange, message, loc);
            return false;
        }
    }
    true
}

/// Shape-check operands against the opcode's format.
///
/// Identifier operands that are not registers pass the immediate slots
/// unchecked here; they are label references resolved in pass 2.
fn validate_operands(
    state: &mut ParseState,
    op: Opcode,
    operands: &[RawOperand],
    loc: SourceLoc,
) -> bool {
    let fmt = op.format();
    if !check_count(state, op, operands, fmt.operand_count(), loc) {
        return false;
    }

    match fmt {
        InstrFormat::Op => true,

        InstrFormat::OpReg => {
            // register or immediate; label references are rejected
            if as_register(&operands[0]).is_none() && !is_immediate(&operands[0]) {
                state.add_error(
                    ValidationErrorKind::OperandTypeMismatch,
                    format!("instruction '{}' expects register operand", op.mnemonic()),
                    loc,
                );
                return false;
            }
            true
        }

        InstrFormat::OpImm24 => check_immediate(state, &operands[0], 24, loc),

        InstrFormat::OpRegImm16 => {
            check_register(state, op, &operands[0], "first", loc)
                && check_immediate(state, &operands[1], 16, loc)
        }

        InstrFormat::OpRegReg => {
            check_register(state, op, &operands[0], "first", loc)
                && check_register(state, op, &operands[1], "second", loc)
        }

        InstrFormat::OpRegRegImm8 => {
            check_register(state, op, &operands[0], "first", loc)
                && check_register(state, op, &operands[1], "second", loc)
                && check_immediate(state, &operands[2], 8, loc)
        }

        InstrFormat::OpRegImm8x2 => {
            check_register(state, op, &operands[0], "first", loc)
                && check_immediate(state, &operands[1], 8, loc)
                && check_immediate(state, &operands[2], 8, loc)
        }

        InstrFormat::OpRegRegReg => {
            for operand in operands {
                if as_register(operand).is_none() {
                    state.add_error(
                        ValidationErrorKind::OperandTypeMismatch,
                        format!(
                            "instruction '{}' all operands must be registers",
                            op.mnemonic()
                        ),
                        loc,
                    );
                    return false;
                }
            }
            true
        }
    }
}

fn classify(operand: &RawOperand) -> Operand {
    match operand {
        RawOperand::Num(value) => Operand::Immediate(*value),
        RawOperand::Ident(name) => match parse_register(name) {
            Some(reg) => Operand::Register(reg),
            None => Operand::Label(name.clone()),
        },
    }
}

/// Build a concrete instruction from label-free operands.
///
/// Immediates are narrowed to the field width here; range validation
/// has already run.
fn build_concrete(op: Opcode, operands: &[Operand]) -> Option<Instruction> {
    let reg = |i: usize| match operands[i] {
        Operand::Register(r) => Some(r),
        _ => None,
    };
    let imm = |i: usize| match operands[i] {
        Operand::Immediate(v) => Some(v),
        _ => None,
    };

    let inst = match op.format() {
        InstrFormat::Op => Instruction::Op { op },
        InstrFormat::OpReg => Instruction::OpReg { op, a: reg(0)? },
        InstrFormat::OpImm24 => Instruction::OpImm24 {
            op,
            addr: imm(0)? & 0x00FF_FFFF,
        },
        InstrFormat::OpRegImm16 => Instruction::OpRegImm16 {
            op,
            a: reg(0)?,
            imm: imm(1)? as u16,
        },
        InstrFormat::OpRegReg => Instruction::OpRegReg {
            op,
            a: reg(0)?,
            b: reg(1)?,
        },
        InstrFormat::OpRegRegImm8 => Instruction::OpRegRegImm8 {
            op,
            a: reg(0)?,
            b: reg(1)?,
            imm: imm(2)? as u8,
        },
        InstrFormat::OpRegImm8x2 => Instruction::OpRegImm8x2 {
            op,
            a: reg(0)?,
            v0: imm(1)? as u8,
            v1: imm(2)? as u8,
        },
        InstrFormat::OpRegRegReg => Instruction::OpRegRegReg {
            op,
            a: reg(0)?,
            b: reg(1)?,
            c: reg(2)?,
        },
    };
    Some(inst)
}

/// Validate one real (non-pseudo) instruction and emit the resulting
/// item into the parse state.
pub fn process_instruction(
    state: &mut ParseState,
    mnemonic: &str,
    operands: &[RawOperand],
    loc: SourceLoc,
) {
    let Some(op) = Opcode::from_mnemonic(mnemonic) else {
        state.add_error(
            ValidationErrorKind::UnknownInstruction,
            format!("unknown instruction: {}", mnemonic),
            loc,
        );
        return;
    };

    if !validate_operands(state, op, operands, loc) {
        return;
    }

    let classified: Vec<Operand> = operands.iter().map(classify).collect();
    let has_labels = classified.iter().any(|o| matches!(o, Operand::Label(_)));

    if !has_labels {
        if let Some(inst) = build_concrete(op, &classified) {
            state.emit_instruction(inst);
            return;
        }
    }
    state.emit_unresolved(op, classified, loc);
}

/// Top-level entry for a parsed instruction line: expand pseudo-ops,
/// then validate and emit each resulting real instruction.
pub fn process_line(
    state: &mut ParseState,
    mnemonic: &str,
    operands: &[RawOperand],
    loc: SourceLoc,
) {
    if is_pseudo(mnemonic) {
        match expand_pseudo(mnemonic, operands) {
            Some(expansions) => {
                for (real_mnemonic, real_operands) in expansions {
                    process_instruction(state, real_mnemonic, &real_operands, loc);
                }
            }
            None => {
                state.add_error(
                    ValidationErrorKind::OperandCountMismatch,
                    format!(
                        "pseudo-instruction '{}' expects 3 operands, got {}",
                        mnemonic,
                        operands.len()
                    ),
                    loc,
                );
            }
        }
    } else {
        process_instruction(state, mnemonic, operands, loc);
    }
}
