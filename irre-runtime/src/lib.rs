//! # IRRE Runtime
//!
//! Single-threaded cooperative virtual machine for the IRRE ISA:
//! fetch, decode, dispatch per instruction variant, with a
//! memory-mapped device model and read-only execution observers.

pub mod error;
pub mod memory;
pub mod registers;
pub mod state;
pub mod observer;
pub mod devices;
pub mod execute;
pub mod vm;
pub mod trace;

pub use devices::{device_ids, ConsoleDevice, Device, DeviceRegistry, NullDevice};
pub use error::{Fault, RuntimeErrorKind};
pub use memory::Memory;
pub use observer::{ExecContext, Observer};
pub use registers::RegisterFile;
pub use state::ExecutionState;
pub use trace::{TraceObserver, TraceVerbosity};
pub use vm::Vm;
