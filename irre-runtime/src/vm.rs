//! The IRRE virtual machine
//!
//! Owns memory, registers, the observer list, and the system
//! callbacks. Execution is single-threaded cooperative: `run` is a
//! loop over `step`, and stepping a halted or errored VM is a no-op.

use crate::error::{Fault, RuntimeErrorKind};
use crate::memory::Memory;
use crate::observer::{ExecContext, Observer};
use crate::state::{ExecutionState, VmState};
use irre_spec::encoding::decode;
use irre_spec::{Address, ObjectFile, Register, Word, DEFAULT_MEMORY_SIZE};
use std::rc::Rc;

/// Callback invoked on `int`, receiving the interrupt code
pub type InterruptHandler = Box<dyn FnMut(Word)>;

/// Callback invoked when the VM faults
pub type ErrorHandler = Box<dyn FnMut(&Fault)>;

/// Callback routing `snd`: (device_id, command, argument) -> result
pub type DeviceAccessHandler = Box<dyn FnMut(Word, Word, Word) -> Word>;

pub struct Vm {
    pub(crate) memory: Memory,
    pub(crate) state: VmState,
    observers: Vec<Rc<dyn Observer>>,
    on_interrupt: Option<InterruptHandler>,
    on_error: Option<ErrorHandler>,
    on_device_access: Option<DeviceAccessHandler>,
}

impl Vm {
    /// VM with the given memory size
    pub fn new(memory_size: usize) -> Self {
        Vm {
            memory: Memory::new(memory_size),
            state: VmState::new(),
            observers: Vec::new(),
            on_interrupt: None,
            on_error: None,
            on_device_access: None,
        }
    }

    /// VM with the default 1 MiB of memory
    pub fn with_default_memory() -> Self {
        Vm::new(DEFAULT_MEMORY_SIZE)
    }

    // ========== Observer and callback management ==========

    pub fn add_observer(&mut self, observer: Rc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn remove_all_observers(&mut self) {
        self.observers.clear();
    }

    pub fn on_interrupt(&mut self, handler: impl FnMut(Word) + 'static) {
        self.on_interrupt = Some(Box::new(handler));
    }

    pub fn on_error(&mut self, handler: impl FnMut(&Fault) + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    pub fn on_device_access(&mut self, handler: impl FnMut(Word, Word, Word) -> Word + 'static) {
        self.on_device_access = Some(Box::new(handler));
    }

    // ========== Program loading ==========

    /// Load an object file: code at address 0, data immediately after,
    /// PC at the entry offset, SP at the top of memory.
    pub fn load_object(&mut self, obj: &ObjectFile) -> Result<(), Fault> {
        self.memory.clear();

        self.memory.load(0, &obj.code).map_err(|e| {
            Fault::new(RuntimeErrorKind::InvalidMemoryAccess, 0, None, e.to_string())
        })?;
        self.memory
            .load(obj.code.len() as Address, &obj.data)
            .map_err(|e| {
                Fault::new(RuntimeErrorKind::InvalidMemoryAccess, 0, None, e.to_string())
            })?;

        self.state.registers.clear();
        self.state.registers.set_pc(obj.entry_offset);
        self.state.registers.set_sp((self.memory.size() - 4) as Word);
        self.state.set_state(ExecutionState::Running);
        self.state.reset_stats();

        tracing::debug!(
            code_bytes = obj.code.len(),
            data_bytes = obj.data.len(),
            entry = obj.entry_offset,
            "program loaded"
        );
        Ok(())
    }

    /// Load a raw binary image at `start_addr` and begin executing there
    pub fn load_binary(&mut self, data: &[u8], start_addr: Address) -> Result<(), Fault> {
        self.memory.clear();
        self.memory.load(start_addr, data).map_err(|e| {
            Fault::new(
                RuntimeErrorKind::InvalidMemoryAccess,
                start_addr,
                None,
                e.to_string(),
            )
        })?;

        self.state.registers.clear();
        self.state.registers.set_pc(start_addr);
        self.state.registers.set_sp((self.memory.size() - 4) as Word);
        self.state.set_state(ExecutionState::Running);
        self.state.reset_stats();
        Ok(())
    }

    // ========== Execution ==========

    /// Execute one instruction.
    ///
    /// Returns `true` while the VM is still running afterwards. On a
    /// non-running VM this is a no-op returning `false`.
    pub fn step(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }

        let pc = self.state.registers.pc();

        if pc % 4 != 0 {
            self.raise(Fault::new(
                RuntimeErrorKind::MisalignedInstruction,
                pc,
                None,
                "instruction fetch at unaligned address",
            ));
            return false;
        }

        let word = match self.memory.read_word(pc) {
            Ok(word) => word,
            Err(err) => {
                self.raise(Fault::new(
                    RuntimeErrorKind::InvalidMemoryAccess,
                    pc,
                    None,
                    err.to_string(),
                ));
                return false;
            }
        };

        // decode failure stops the step before any pre-execute hook
        let inst = match decode(word) {
            Ok(inst) => inst,
            Err(err) => {
                let bytes = word.to_le_bytes();
                self.raise(Fault::new(
                    RuntimeErrorKind::InvalidInstruction,
                    pc,
                    Some(word),
                    format!(
                        "{}: 0x{:08x} ({:02x} {:02x} {:02x} {:02x})",
                        err, word, bytes[0], bytes[1], bytes[2], bytes[3]
                    ),
                ));
                return false;
            }
        };

        let observers = self.observers.clone();
        for obs in &observers {
            obs.pre_execute(&ExecContext {
                pc,
                word,
                inst: &inst,
                regs: &self.state.registers,
                memory: &self.memory,
            });
        }

        let next_pc = pc.wrapping_add(4);
        if let Err(fault) = self.execute(&inst) {
            self.raise(fault);
            return false;
        }

        // advance only when the instruction left PC alone
        if self.state.registers.pc() == pc && self.state.is_running() {
            self.state.registers.set_pc(next_pc);
        }

        for obs in &observers {
            obs.post_execute(&ExecContext {
                pc,
                word,
                inst: &inst,
                regs: &self.state.registers,
                memory: &self.memory,
            });
        }

        if self.state.state == ExecutionState::Halted {
            for obs in &observers {
                obs.on_halt();
            }
        }

        self.state.inc_instruction_count();
        self.state.is_running()
    }

    /// Run until halt, error, or `max_instructions` successful steps
    /// (0 means unbounded).
    pub fn run(&mut self, max_instructions: u64) -> ExecutionState {
        let mut count = 0u64;
        while self.step() {
            count += 1;
            if max_instructions > 0 && count >= max_instructions {
                break;
            }
        }
        self.state.state
    }

    /// Reset to the initial halted state with cleared memory
    pub fn reset(&mut self) {
        self.state.registers.clear();
        self.state.set_state(ExecutionState::Halted);
        self.state.reset_stats();
        self.memory.clear();
    }

    fn raise(&mut self, fault: Fault) {
        tracing::warn!(fault = %fault, "runtime fault");
        let observers = self.observers.clone();
        for obs in &observers {
            obs.on_error(&fault);
        }
        if let Some(handler) = self.on_error.as_mut() {
            handler(&fault);
        }
        self.state.fault(fault);
    }

    // hooks used by the execution engine

    pub(crate) fn raise_interrupt(&mut self, code: Word) {
        if let Some(handler) = self.on_interrupt.as_mut() {
            handler(code);
        }
    }

    pub(crate) fn device_access(&mut self, device_id: Word, command: Word, argument: Word) -> Word {
        match self.on_device_access.as_mut() {
            Some(handler) => handler(device_id, command, argument),
            None => {
                tracing::warn!(device_id, command, "snd with no device handler installed");
                0
            }
        }
    }

    pub(crate) fn notify_memory_read(&self, addr: Address, value: Word) {
        for obs in &self.observers {
            obs.on_memory_read(addr, value);
        }
    }

    pub(crate) fn notify_memory_write(&self, addr: Address, value: Word) {
        for obs in &self.observers {
            obs.on_memory_write(addr, value);
        }
    }

    // ========== Accessors ==========

    pub fn execution_state(&self) -> ExecutionState {
        self.state.state
    }

    pub fn last_fault(&self) -> Option<&Fault> {
        self.state.last_fault.as_ref()
    }

    pub fn instruction_count(&self) -> u64 {
        self.state.instruction_count
    }

    pub fn cycle_count(&self) -> u64 {
        self.state.cycle_count
    }

    pub fn stats(&self) -> String {
        self.state.stats()
    }

    pub fn register(&self, reg: Register) -> Word {
        self.state.registers.read(reg)
    }

    /// Debug mutator; intended for tests and debuggers between steps
    pub fn set_register(&mut self, reg: Register, value: Word) {
        self.state.registers.write(reg, value);
    }

    pub fn pc(&self) -> Word {
        self.state.registers.pc()
    }

    /// Debug mutator; intended for tests and debuggers between steps
    pub fn set_pc(&mut self, value: Word) {
        self.state.registers.set_pc(value);
    }

    /// Debug mutator: force the execution state (tests and debuggers)
    pub fn set_execution_state(&mut self, state: ExecutionState) {
        self.state.set_state(state);
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
}
