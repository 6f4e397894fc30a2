//! Error types for the IRRE disassembler

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisassemblerError {
    /// Raw input length is not a multiple of the 4-byte word size
    #[error("invalid input size: {0} bytes is not a multiple of 4")]
    InvalidSize(usize),
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
