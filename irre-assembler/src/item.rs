//! Assembly items and parse state
//!
//! Parsing produces a flat sequence of items in source order; labels
//! bind to the address of the next item during symbol construction.

use irre_spec::{Instruction, Opcode, Register};

/// 1-based source position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLoc {
    pub line: usize,
    pub column: usize,
}

impl SourceLoc {
    pub const fn new(line: usize, column: usize) -> Self {
        SourceLoc { line, column }
    }
}

/// An instruction operand before symbol resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate(u32),
    Label(String),
}

/// An instruction whose operands may still reference labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedInstruction {
    pub op: Opcode,
    pub operands: Vec<Operand>,
    pub location: SourceLoc,
}

/// A label definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDef {
    pub name: String,
    pub location: SourceLoc,
}

/// A `%d` data payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    pub bytes: Vec<u8>,
    pub location: SourceLoc,
}

/// One parsed assembly item, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmItem {
    /// Fully resolved instruction (4 bytes)
    Instruction(Instruction),
    /// Instruction with at least one label operand (4 bytes)
    Unresolved(UnresolvedInstruction),
    /// Label definition (0 bytes)
    Label(LabelDef),
    /// Data payload (its byte length)
    Data(DataBlock),
}

impl AsmItem {
    /// Bytes this item contributes to the running address
    pub fn size(&self) -> u32 {
        match self {
            AsmItem::Instruction(_) | AsmItem::Unresolved(_) => 4,
            AsmItem::Label(_) => 0,
            AsmItem::Data(block) => block.bytes.len() as u32,
        }
    }
}

/// A validation problem found while parsing; collection continues so
/// the first error is reported at its true location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub location: SourceLoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    UnknownInstruction,
    UnknownRegister,
    InvalidImmediate,
    OperandCountMismatch,
    OperandTypeMismatch,
    ImmediateOutOfRange,
    InvalidDirective,
}

/// Mutable state threaded through the grammar actions
#[derive(Debug, Default)]
pub struct ParseState {
    pub items: Vec<AsmItem>,
    pub entry_label: Option<String>,
    pub current_section: String,
    pub errors: Vec<ValidationError>,
}

impl ParseState {
    pub fn new() -> Self {
        ParseState {
            items: Vec::new(),
            entry_label: None,
            current_section: "code".to_string(),
            errors: Vec::new(),
        }
    }

    pub fn emit_label(&mut self, name: String, location: SourceLoc) {
        self.items.push(AsmItem::Label(LabelDef { name, location }));
    }

    pub fn emit_instruction(&mut self, inst: Instruction) {
        self.items.push(AsmItem::Instruction(inst));
    }

    pub fn emit_unresolved(&mut self, op: Opcode, operands: Vec<Operand>, location: SourceLoc) {
        self.items.push(AsmItem::Unresolved(UnresolvedInstruction {
            op,
            operands,
            location,
        }));
    }

    pub fn emit_data(&mut self, bytes: Vec<u8>, location: SourceLoc) {
        self.items.push(AsmItem::Data(DataBlock { bytes, location }));
    }

    pub fn set_entry(&mut self, label: String) {
        self.entry_label = Some(label);
    }

    pub fn set_section(&mut self, name: String) {
        self.current_section = name;
    }

    pub fn add_error(&mut self, kind: ValidationErrorKind, message: String, location: SourceLoc) {
        self.errors.push(ValidationError {
            kind,
            message,
            location,
        });
    }
}
