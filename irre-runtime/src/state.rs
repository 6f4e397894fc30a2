//! VM execution state and statistics

use crate::error::Fault;
use crate::registers::RegisterFile;

/// Execution state of the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Executing instructions
    Running,
    /// Halted normally (initial state, or after `hlt`)
    Halted,
    /// Terminal error state
    Error,
}

/// Register file, execution state, and counters
#[derive(Debug, Clone)]
pub struct VmState {
    pub registers: RegisterFile,
    pub state: ExecutionState,
    pub instruction_count: u64,
    pub cycle_count: u64,
    /// The fault that moved the VM into the error state, if any
    pub last_fault: Option<Fault>,
}

impl VmState {
    pub fn new() -> Self {
        VmState {
            registers: RegisterFile::new(),
            state: ExecutionState::Halted,
            instruction_count: 0,
            cycle_count: 0,
            last_fault: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ExecutionState::Running
    }

    pub fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
    }

    pub fn fault(&mut self, fault: Fault) {
        self.state = ExecutionState::Error;
        self.last_fault = Some(fault);
    }

    pub fn inc_instruction_count(&mut self) {
        self.instruction_count += 1;
        // 1:1 cycle model
        self.cycle_count += 1;
    }

    pub fn reset_stats(&mut self) {
        self.instruction_count = 0;
        self.cycle_count = 0;
        self.last_fault = None;
    }

    pub fn stats(&self) -> String {
        format!(
            "instructions: {}, cycles: {}",
            self.instruction_count, self.cycle_count
        )
    }
}

impl Default for VmState {
    fn default() -> Self {
        VmState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeErrorKind;

    #[test]
    fn test_initial_state_is_halted() {
        let state = VmState::new();
        assert_eq!(state.state, ExecutionState::Halted);
        assert!(!state.is_running());
        assert_eq!(state.instruction_count, 0);
    }

    #[test]
    fn test_fault_is_terminal() {
        let mut state = VmState::new();
        state.set_state(ExecutionState::Running);
        state.fault(Fault::new(
            RuntimeErrorKind::DivisionByZero,
            8,
            None,
            "divisor is zero",
        ));
        assert_eq!(state.state, ExecutionState::Error);
        assert_eq!(
            state.last_fault.as_ref().unwrap().kind,
            RuntimeErrorKind::DivisionByZero
        );
    }

    #[test]
    fn test_counters() {
        let mut state = VmState::new();
        state.inc_instruction_count();
        state.inc_instruction_count();
        assert_eq!(state.instruction_count, 2);
        assert_eq!(state.cycle_count, 2);
        assert_eq!(state.stats(), "instructions: 2, cycles: 2");
        state.reset_stats();
        assert_eq!(state.instruction_count, 0);
    }
}
