//! # IRRE Toolchain
//!
//! Facade over the IRRE crates: assembler, disassembler, and emulator
//! for the 32-bit fixed-width register virtual ISA.

pub use irre_assembler as assembler;
pub use irre_disassembler as disassembler;
pub use irre_runtime as runtime;
pub use irre_spec as spec;

pub use irre_assembler::assemble;
pub use irre_disassembler::{Disassembler, ListingFormat};
pub use irre_runtime::Vm;
pub use irre_spec::{Instruction, ObjectFile, Opcode, Register};
