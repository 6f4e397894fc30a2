//! # IRRE Specification
//!
//! 32-bit fixed-width register virtual ISA.
//!
//! ## Key Features
//! - 37 registers: r0-r31 plus pc, lr, ad, at, sp
//! - Single-byte sparse opcodes, eight instruction formats
//! - Every instruction encodes to one little-endian 32-bit word
//! - `RGVM` object-file container (24-byte header + code + data)

pub mod register;
pub mod opcode;
pub mod instruction;
pub mod encoding;
pub mod object;
pub mod error;

pub use register::{Register, NUM_REGISTERS};
pub use opcode::{Opcode, InstrFormat};
pub use instruction::Instruction;
pub use object::ObjectFile;
pub use error::{DecodeError, ObjectError};

/// Object-file magic bytes: "RGVM"
pub const MAGIC: [u8; 4] = *b"RGVM";

/// Object-file format version
pub const VERSION: u16 = 1;

/// Object-file header size in bytes
pub const HEADER_SIZE: usize = 24;

/// Maximum size of each object-file section (16 MiB)
pub const MAX_SECTION_SIZE: u32 = 0x100_0000;

/// Default emulator memory size (1 MiB)
pub const DEFAULT_MEMORY_SIZE: usize = 1024 * 1024;

/// Word size (32-bit)
pub type Word = u32;

/// Address type (32-bit)
pub type Address = u32;

/// Signed word
pub type SWord = i32;

/// Byte
pub type Byte = u8;
