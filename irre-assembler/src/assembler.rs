//! Assembler driver
//!
//! Orchestrates parse -> validate -> resolve -> encode -> object file.

use crate::error::{AssemblerError, Result};
use crate::item::{AsmItem, ValidationError, ValidationErrorKind};
use crate::parser::parse_source;
use crate::symbols::{resolve_items, SymbolError, SymbolTable};
use irre_spec::{encoding, ObjectFile};

/// Assemble source text into an object file.
///
/// The first collected validation error is reported with its source
/// location; symbol errors surface after parsing succeeds.
pub fn assemble(source: &str) -> Result<ObjectFile> {
    let state = parse_source(source)?;

    if let Some(first) = state.errors.first() {
        return Err(map_validation_error(first));
    }

    let symbols = SymbolTable::build(&state.items).map_err(map_symbol_error)?;
    let instructions = resolve_items(&symbols, &state.items).map_err(map_symbol_error)?;

    let code = encoding::encode_all(&instructions);
    let data = collect_data_blocks(&state.items);

    let entry_offset = state
        .entry_label
        .as_deref()
        .map(|label| symbols.entry_address(label))
        .unwrap_or(0);

    Ok(ObjectFile {
        entry_offset,
        code,
        data,
    })
}

/// Data blocks concatenate in source order into the data section
fn collect_data_blocks(items: &[AsmItem]) -> Vec<u8> {
    let mut data = Vec::new();
    for item in items {
        if let AsmItem::Data(block) = item {
            data.extend_from_slice(&block.bytes);
        }
    }
    data
}

fn map_validation_error(error: &ValidationError) -> AssemblerError {
    let line = error.location.line;
    let column = error.location.column;
    let message = error.message.clone();
    match error.kind {
        ValidationErrorKind::UnknownInstruction
        | ValidationErrorKind::OperandCountMismatch
        | ValidationErrorKind::OperandTypeMismatch => AssemblerError::InvalidInstruction {
            line,
            column,
            message,
        },
        ValidationErrorKind::UnknownRegister => AssemblerError::InvalidRegister {
            line,
            column,
            message,
        },
        ValidationErrorKind::InvalidImmediate | ValidationErrorKind::ImmediateOutOfRange => {
            AssemblerError::InvalidImmediate {
                line,
                column,
                message,
            }
        }
        ValidationErrorKind::InvalidDirective => AssemblerError::InvalidDirective {
            line,
            column,
            message,
        },
    }
}

fn map_symbol_error(error: SymbolError) -> AssemblerError {
    let loc = error.location();
    let message = error.to_string();
    match error {
        SymbolError::Duplicate { .. } => AssemblerError::DuplicateLabel {
            line: loc.line,
            column: loc.column,
            message,
        },
        SymbolError::Undefined { .. } => AssemblerError::UndefinedSymbol {
            line: loc.line,
            column: loc.column,
            message,
        },
        SymbolError::InvalidReference { .. } => AssemblerError::InvalidInstruction {
            line: loc.line,
            column: loc.column,
            message,
        },
    }
}
