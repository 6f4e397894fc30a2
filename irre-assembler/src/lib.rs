//! # IRRE Assembler
//!
//! Two-pass assembler: parse source into assembly items, build a
//! symbol table, resolve label references, encode to an object file.
//!
//! ## Example
//!
//! ```rust
//! use irre_assembler::assemble;
//!
//! let source = r#"
//!     %entry: main
//!     main:
//!         set r0 42
//!         hlt
//! "#;
//!
//! let object = assemble(source).unwrap();
//! assert_eq!(object.code.len(), 8);
//! ```

pub mod error;
pub mod item;
pub mod lexer;
pub mod parser;
pub mod validate;
pub mod symbols;
pub mod assembler;

pub use assembler::assemble;
pub use error::{AssemblerError, Result};
pub use item::{AsmItem, Operand, ParseState, SourceLoc};
pub use parser::parse_source;
pub use symbols::SymbolTable;
pub use validate::parse_register;
