//! Execution observers
//!
//! Observers are shared references installed on the VM; they receive
//! read-only views of VM state during callbacks. Hooks default to
//! no-ops so implementors pick only the events they care about.

use crate::error::Fault;
use crate::memory::Memory;
use crate::registers::RegisterFile;
use irre_spec::{Address, Instruction, Word};

/// Read-only view of the VM handed to pre/post-execute hooks
pub struct ExecContext<'a> {
    /// PC of the instruction being executed
    pub pc: Address,
    /// Raw instruction word as fetched
    pub word: Word,
    /// Decoded instruction
    pub inst: &'a Instruction,
    pub regs: &'a RegisterFile,
    pub memory: &'a Memory,
}

/// Callback bundle for VM execution events.
///
/// Hooks take `&self`; observers that accumulate state use interior
/// mutability. The VM never mutates observers.
pub trait Observer {
    /// Before an instruction executes (decode already succeeded)
    fn pre_execute(&self, _ctx: &ExecContext<'_>) {}

    /// After an instruction executed without fault
    fn post_execute(&self, _ctx: &ExecContext<'_>) {}

    /// Memory read performed by the executing instruction
    fn on_memory_read(&self, _addr: Address, _value: Word) {}

    /// Memory write performed by the executing instruction
    fn on_memory_write(&self, _addr: Address, _value: Word) {}

    /// A runtime fault moved the VM to the error state
    fn on_error(&self, _fault: &Fault) {}

    /// The VM transitioned to halted
    fn on_halt(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CountingObserver {
        events: RefCell<Vec<&'static str>>,
    }

    impl Observer for CountingObserver {
        fn pre_execute(&self, _ctx: &ExecContext<'_>) {
            self.events.borrow_mut().push("pre");
        }
        fn on_halt(&self) {
            self.events.borrow_mut().push("halt");
        }
    }

    #[test]
    fn test_default_hooks_are_noops() {
        // an observer implementing nothing is valid
        struct Silent;
        impl Observer for Silent {}

        let silent = Silent;
        silent.on_halt();
        silent.on_memory_read(0, 0);
    }

    #[test]
    fn test_interior_mutability_pattern() {
        let obs = CountingObserver::default();
        obs.on_halt();
        assert_eq!(*obs.events.borrow(), vec!["halt"]);
    }
}
