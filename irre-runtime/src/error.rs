//! Runtime fault types
//!
//! A fault is a rich record: the kind, the PC at fault, the raw
//! instruction word when one was decoded, and a human message. Faults
//! move the VM into its terminal error state.

use irre_spec::{Address, Word};
use thiserror::Error;

/// Runtime error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeErrorKind {
    InvalidMemoryAccess,
    DivisionByZero,
    InvalidRegister,
    InvalidInstruction,
    MisalignedInstruction,
    DeviceError,
}

impl RuntimeErrorKind {
    pub const fn name(self) -> &'static str {
        match self {
            RuntimeErrorKind::InvalidMemoryAccess => "invalid memory access",
            RuntimeErrorKind::DivisionByZero => "division by zero",
            RuntimeErrorKind::InvalidRegister => "invalid register",
            RuntimeErrorKind::InvalidInstruction => "invalid instruction",
            RuntimeErrorKind::MisalignedInstruction => "misaligned instruction",
            RuntimeErrorKind::DeviceError => "device error",
        }
    }
}

/// A runtime fault with full context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} at pc 0x{pc:08x}: {message}", .kind.name())]
pub struct Fault {
    pub kind: RuntimeErrorKind,
    /// PC at the time of the fault
    pub pc: Address,
    /// The instruction word, when one was fetched
    pub word: Option<Word>,
    pub message: String,
}

impl Fault {
    pub fn new(
        kind: RuntimeErrorKind,
        pc: Address,
        word: Option<Word>,
        message: impl Into<String>,
    ) -> Self {
        Fault {
            kind,
            pc,
            word,
            message: message.into(),
        }
    }
}

/// Bounds violation reported by the memory subsystem; the execution
/// engine wraps it into a [`Fault`] with the faulting PC attached.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("memory access out of bounds at 0x{address:08x} ({len} bytes)")]
pub struct OutOfBounds {
    pub address: Address,
    pub len: usize,
}
