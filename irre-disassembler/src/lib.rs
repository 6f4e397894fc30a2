//! # IRRE Disassembler
//!
//! Recover a textual listing from an object file or a raw instruction
//! stream. Words that fail to decode become inline `; ERROR:` comment
//! lines; disassembly never aborts mid-stream.
//!
//! ## Example
//!
//! ```rust
//! use irre_disassembler::{Disassembler, ListingFormat};
//! use irre_spec::ObjectFile;
//!
//! let obj = ObjectFile {
//!     entry_offset: 0,
//!     code: vec![0x2a, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x00, 0xff],
//!     data: vec![],
//! };
//!
//! let listing = Disassembler::new().disassemble_object(&obj, ListingFormat::Basic).unwrap();
//! assert_eq!(listing, "set r0 0x002a\nhlt");
//! ```

pub mod error;
pub mod formatter;
pub mod disassembler;

pub use disassembler::{Disassembler, ListingFormat};
pub use error::{DisassemblerError, Result};
pub use formatter::DisasmOptions;

use irre_spec::ObjectFile;

/// Disassemble an object file with default options, annotated format
pub fn disassemble_object(obj: &ObjectFile) -> Result<String> {
    Disassembler::new().disassemble_object(obj, ListingFormat::Annotated)
}

/// Disassemble raw instruction bytes with default options
pub fn disassemble_bytes(bytes: &[u8]) -> Result<String> {
    Disassembler::new().disassemble_bytes(bytes, ListingFormat::Annotated)
}
