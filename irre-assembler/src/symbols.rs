//! Symbol table and two-pass resolution
//!
//! Pass 1 walks the item list with a running address (instructions 4
//! bytes, data blocks their length, labels 0) and records each label's
//! address. Pass 2 rewrites unresolved instructions into concrete
//! ones, truncating resolved addresses to the operand slot width.

use crate::item::{AsmItem, Operand, SourceLoc, UnresolvedInstruction};
use irre_spec::{InstrFormat, Instruction, Register};
use std::collections::HashMap;
use thiserror::Error;

/// Symbol resolution failures, carrying the offending name and location
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("duplicate symbol '{name}'")]
    Duplicate { name: String, location: SourceLoc },

    #[error("undefined symbol '{name}'")]
    Undefined { name: String, location: SourceLoc },

    #[error("{message}")]
    InvalidReference { message: String, location: SourceLoc },
}

impl SymbolError {
    pub fn location(&self) -> SourceLoc {
        match self {
            SymbolError::Duplicate { location, .. }
            | SymbolError::Undefined { location, .. }
            | SymbolError::InvalidReference { location, .. } => *location,
        }
    }
}

/// Label name to address mapping, with first-definition locations
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, u32>,
    locations: HashMap<String, SourceLoc>,
}

impl SymbolTable {
    /// Pass 1: build the table from items in source order.
    ///
    /// The address a label binds to equals the sum of the sizes of all
    /// items preceding it.
    pub fn build(items: &[AsmItem]) -> Result<Self, SymbolError> {
        let mut table = SymbolTable::default();
        let mut address = 0u32;

        for item in items {
            if let AsmItem::Label(label) = item {
                if table.symbols.contains_key(&label.name) {
                    return Err(SymbolError::Duplicate {
                        name: label.name.clone(),
                        location: label.location,
                    });
                }
                table.symbols.insert(label.name.clone(), address);
                table.locations.insert(label.name.clone(), label.location);
            }
            address += item.size();
        }

        Ok(table)
    }

    /// Address of a label, if defined
    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Location of a label's first definition
    pub fn location(&self, name: &str) -> Option<SourceLoc> {
        self.locations.get(name).copied()
    }

    /// Entry address for the given label; 0 when the label is unknown
    pub fn entry_address(&self, entry_label: &str) -> u32 {
        self.resolve(entry_label).unwrap_or(0)
    }
}

/// Pass 2: convert items to a concrete instruction sequence.
///
/// Labels and data blocks are skipped; instruction order is preserved.
pub fn resolve_items(
    symbols: &SymbolTable,
    items: &[AsmItem],
) -> Result<Vec<Instruction>, SymbolError> {
    let mut out = Vec::new();

    for item in items {
        match item {
            AsmItem::Instruction(inst) => out.push(*inst),
            AsmItem::Unresolved(unresolved) => out.push(resolve_instruction(symbols, unresolved)?),
            AsmItem::Label(_) | AsmItem::Data(_) => {}
        }
    }

    Ok(out)
}

/// Resolved operand value: register or integer already narrowed to the
/// slot width
enum Resolved {
    Register(Register),
    Value(u32),
}

fn resolve_operand(
    symbols: &SymbolTable,
    operand: &Operand,
    location: SourceLoc,
    width_mask: u32,
) -> Result<Resolved, SymbolError> {
    match operand {
        Operand::Register(reg) => Ok(Resolved::Register(*reg)),
        Operand::Immediate(value) => Ok(Resolved::Value(value & width_mask)),
        Operand::Label(name) => match symbols.resolve(name) {
            Some(addr) => Ok(Resolved::Value(addr & width_mask)),
            None => Err(SymbolError::Undefined {
                name: name.clone(),
                location,
            }),
        },
    }
}

fn expect_register(resolved: Resolved, location: SourceLoc) -> Result<Register, SymbolError> {
    match resolved {
        Resolved::Register(reg) => Ok(reg),
        Resolved::Value(_) => Err(SymbolError::InvalidReference {
            message: "operand must be a register".to_string(),
            location,
        }),
    }
}

fn expect_value(resolved: Resolved, location: SourceLoc) -> Result<u32, SymbolError> {
    match resolved {
        Resolved::Value(value) => Ok(value),
        Resolved::Register(_) => Err(SymbolError::InvalidReference {
            message: "operand must be an immediate or label".to_string(),
            location,
        }),
    }
}

fn resolve_instruction(
    symbols: &SymbolTable,
    unresolved: &UnresolvedInstruction,
) -> Result<Instruction, SymbolError> {
    let op = unresolved.op;
    let loc = unresolved.location;
    let operands = &unresolved.operands;

    let bad_shape = || SymbolError::InvalidReference {
        message: format!("instruction '{}' has malformed operands", op.mnemonic()),
        location: loc,
    };

    let get = |i: usize| operands.get(i).ok_or_else(bad_shape);

    let inst = match op.format() {
        InstrFormat::Op => Instruction::Op { op },

        InstrFormat::OpReg => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            Instruction::OpReg { op, a }
        }

        InstrFormat::OpImm24 => {
            let addr = expect_value(
                resolve_operand(symbols, get(0)?, loc, 0x00FF_FFFF)?,
                loc,
            )?;
            Instruction::OpImm24 { op, addr }
        }

        InstrFormat::OpRegImm16 => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            let imm = expect_value(resolve_operand(symbols, get(1)?, loc, 0xFFFF)?, loc)?;
            Instruction::OpRegImm16 {
                op,
                a,
                imm: imm as u16,
            }
        }

        InstrFormat::OpRegReg => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            let b = expect_register(resolve_operand(symbols, get(1)?, loc, u32::MAX)?, loc)?;
            Instruction::OpRegReg { op, a, b }
        }

        InstrFormat::OpRegRegImm8 => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            let b = expect_register(resolve_operand(symbols, get(1)?, loc, u32::MAX)?, loc)?;
            let imm = expect_value(resolve_operand(symbols, get(2)?, loc, 0xFF)?, loc)?;
            Instruction::OpRegRegImm8 {
                op,
                a,
                b,
                imm: imm as u8,
            }
        }

        InstrFormat::OpRegImm8x2 => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            let v0 = expect_value(resolve_operand(symbols, get(1)?, loc, 0xFF)?, loc)?;
            let v1 = expect_value(resolve_operand(symbols, get(2)?, loc, 0xFF)?, loc)?;
            Instruction::OpRegImm8x2 {
                op,
                a,
                v0: v0 as u8,
                v1: v1 as u8,
            }
        }

        InstrFormat::OpRegRegReg => {
            let a = expect_register(resolve_operand(symbols, get(0)?, loc, u32::MAX)?, loc)?;
            let b = expect_register(resolve_operand(symbols, get(1)?, loc, u32::MAX)?, loc)?;
            let c = expect_register(resolve_operand(symbols, get(2)?, loc, u32::MAX)?, loc)?;
            Instruction::OpRegRegReg { op, a, b, c }
        }
    };

    Ok(inst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DataBlock, LabelDef, ParseState};
    use crate::parser::parse_source;
    use irre_spec::Opcode;

    fn label(name: &str, line: usize) -> AsmItem {
        AsmItem::Label(LabelDef {
            name: name.to_string(),
            location: SourceLoc::new(line, 1),
        })
    }

    #[test]
    fn test_running_address() {
        let items = vec![
            label("start", 1),
            AsmItem::Instruction(Instruction::nop()),
            AsmItem::Instruction(Instruction::nop()),
            label("mid", 4),
            AsmItem::Data(DataBlock {
                bytes: vec![0; 6],
                location: SourceLoc::default(),
            }),
            label("end", 6),
        ];
        let table = SymbolTable::build(&items).unwrap();
        assert_eq!(table.resolve("start"), Some(0));
        assert_eq!(table.resolve("mid"), Some(8));
        assert_eq!(table.resolve("end"), Some(14));
        assert_eq!(table.resolve("missing"), None);
    }

    #[test]
    fn test_duplicate_symbol() {
        let items = vec![label("x", 1), label("x", 3)];
        let err = SymbolTable::build(&items).unwrap_err();
        assert_eq!(
            err,
            SymbolError::Duplicate {
                name: "x".to_string(),
                location: SourceLoc::new(3, 1),
            }
        );
        assert_eq!(err.to_string(), "duplicate symbol 'x'");
    }

    #[test]
    fn test_resolve_forward_reference() {
        let state = parse_source("jmi end\nnop\nend:\nhlt\n").unwrap();
        let table = SymbolTable::build(&state.items).unwrap();
        let instructions = resolve_items(&table, &state.items).unwrap();
        assert_eq!(instructions.len(), 3);
        assert_eq!(
            instructions[0],
            Instruction::OpImm24 {
                op: Opcode::Jmi,
                addr: 8
            }
        );
    }

    #[test]
    fn test_undefined_symbol() {
        let state = parse_source("jmi nowhere\n").unwrap();
        let table = SymbolTable::build(&state.items).unwrap();
        let err = resolve_items(&table, &state.items).unwrap_err();
        assert_eq!(err.to_string(), "undefined symbol 'nowhere'");
    }

    #[test]
    fn test_eight_bit_truncation() {
        // a label at 0x104 referenced from an 8-bit slot keeps its low byte
        let mut state = ParseState::new();
        for _ in 0..65 {
            state.emit_instruction(Instruction::nop());
        }
        state.emit_label("target".to_string(), SourceLoc::new(66, 1));
        state.emit_unresolved(
            Opcode::Seq,
            vec![
                Operand::Register(Register::R0),
                Operand::Register(Register::R1),
                Operand::Label("target".to_string()),
            ],
            SourceLoc::new(67, 1),
        );

        let table = SymbolTable::build(&state.items).unwrap();
        assert_eq!(table.resolve("target"), Some(0x104));
        let instructions = resolve_items(&table, &state.items).unwrap();
        assert_eq!(
            instructions.last().unwrap(),
            &Instruction::seq(Register::R0, Register::R1, 0x04)
        );
    }

    #[test]
    fn test_labels_and_data_skipped_in_output() {
        let state = parse_source("a:\nnop\n%d 7\nb:\nhlt\n").unwrap();
        let table = SymbolTable::build(&state.items).unwrap();
        let instructions = resolve_items(&table, &state.items).unwrap();
        assert_eq!(
            instructions,
            vec![Instruction::nop(), Instruction::hlt()]
        );
        // data block occupies 4 bytes between nop and b
        assert_eq!(table.resolve("b"), Some(8));
    }

    #[test]
    fn test_entry_address_fallback() {
        let table = SymbolTable::build(&[label("main", 1)]).unwrap();
        assert_eq!(table.entry_address("main"), 0);
        assert_eq!(table.entry_address("ghost"), 0);
    }

    #[test]
    fn test_register_slot_rejects_value() {
        let mut state = ParseState::new();
        state.emit_unresolved(
            Opcode::Jmp,
            vec![Operand::Immediate(16)],
            SourceLoc::new(1, 1),
        );
        let table = SymbolTable::build(&state.items).unwrap();
        let err = resolve_items(&table, &state.items).unwrap_err();
        assert!(matches!(err, SymbolError::InvalidReference { .. }));
    }
}
