//! Error types for the IRRE specification crate

use thiserror::Error;

/// Errors produced while decoding an instruction word
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The opcode byte is not in the opcode table
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),

    /// A register field used by the opcode's format is out of range
    #[error("invalid register 0x{0:02x}")]
    InvalidRegister(u8),

    /// Byte input shorter than one instruction word
    #[error("malformed instruction: got {0} bytes, need 4")]
    Malformed(usize),
}

/// Errors produced while parsing an object file
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectError {
    #[error("empty file - cannot load object file from empty data")]
    Empty,

    #[error("file too small ({0} bytes) - IRRE object files require at least 24 bytes for header")]
    TooSmall(usize),

    #[error("invalid magic bytes '{found}' - expected 'RGVM' for IRRE object file")]
    BadMagic { found: String },

    #[error("unsupported version {found} - this loader supports version {expected}")]
    BadVersion { found: u16, expected: u16 },

    #[error("code section too large ({0} bytes) - maximum is 16MB")]
    CodeTooLarge(u32),

    #[error("data section too large ({0} bytes) - maximum is 16MB")]
    DataTooLarge(u32),

    #[error(
        "file size mismatch - got {got} bytes, expected {expected} bytes \
         (24 header + {code} code + {data} data)"
    )]
    SizeMismatch {
        got: usize,
        expected: usize,
        code: u32,
        data: u32,
    },

    #[error("entry point at offset {entry} is outside code section (size {code_size} bytes)")]
    EntryOutOfRange { entry: u32, code_size: u32 },

    #[error("entry point at offset {0} is not 4-byte aligned (instructions must be aligned)")]
    EntryMisaligned(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::InvalidOpcode(0x11).to_string(),
            "invalid opcode 0x11"
        );
        assert_eq!(
            DecodeError::InvalidRegister(0x99).to_string(),
            "invalid register 0x99"
        );
        assert_eq!(
            DecodeError::Malformed(2).to_string(),
            "malformed instruction: got 2 bytes, need 4"
        );
    }

    #[test]
    fn test_object_error_display() {
        let err = ObjectError::BadMagic {
            found: "BAD!".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid magic bytes 'BAD!' - expected 'RGVM' for IRRE object file"
        );

        let err = ObjectError::EntryOutOfRange {
            entry: 32,
            code_size: 16,
        };
        assert!(err.to_string().contains("outside code section"));

        let err = ObjectError::EntryMisaligned(3);
        assert!(err.to_string().contains("not 4-byte aligned"));
    }
}
