//! Execution trace observer
//!
//! Prints one line per executed instruction. `Basic` verbosity shows
//! PC, the raw word, and the disassembled text; `Semantic` appends the
//! register values written and any memory access the instruction made.

use crate::observer::{ExecContext, Observer};
use irre_spec::{Address, Instruction, Register, Word};
use std::cell::RefCell;
use std::io::Write;

/// How much detail each trace line carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceVerbosity {
    /// Instruction disassembly only
    #[default]
    Basic,
    /// Disassembly plus written registers and memory accesses
    Semantic,
}

/// Registers an instruction writes, for semantic trace capture
fn written_registers(inst: &Instruction) -> Vec<Register> {
    match *inst {
        Instruction::Op { op } => match op {
            irre_spec::Opcode::Ret => vec![Register::Pc, Register::Lr],
            _ => vec![],
        },
        Instruction::OpReg { op, .. } => match op {
            irre_spec::Opcode::Jmp => vec![Register::Pc],
            irre_spec::Opcode::Cal => vec![Register::Lr, Register::Pc],
            _ => vec![],
        },
        Instruction::OpImm24 { op, .. } => match op {
            irre_spec::Opcode::Jmi => vec![Register::Pc],
            _ => vec![],
        },
        Instruction::OpRegImm16 { a, .. } => vec![a],
        Instruction::OpRegReg { a, .. } => vec![a],
        Instruction::OpRegRegImm8 { op, a, .. } => match op {
            irre_spec::Opcode::Stw | irre_spec::Opcode::Stb => vec![],
            irre_spec::Opcode::Bve | irre_spec::Opcode::Bvn => vec![Register::Pc],
            _ => vec![a],
        },
        Instruction::OpRegImm8x2 { a, .. } => vec![a],
        Instruction::OpRegRegReg { op, a, c, .. } => match op {
            irre_spec::Opcode::Snd => vec![c],
            _ => vec![a],
        },
    }
}

struct PendingAccess {
    read: Option<(Address, Word)>,
    write: Option<(Address, Word)>,
}

/// Observer that writes a trace to any sink (stdout by default)
pub struct TraceObserver {
    verbosity: TraceVerbosity,
    sink: RefCell<Box<dyn Write>>,
    pending: RefCell<PendingAccess>,
}

impl TraceObserver {
    pub fn new(verbosity: TraceVerbosity) -> Self {
        TraceObserver::with_sink(verbosity, Box::new(std::io::stdout()))
    }

    pub fn with_sink(verbosity: TraceVerbosity, sink: Box<dyn Write>) -> Self {
        TraceObserver {
            verbosity,
            sink: RefCell::new(sink),
            pending: RefCell::new(PendingAccess {
                read: None,
                write: None,
            }),
        }
    }
}

impl Observer for TraceObserver {
    fn pre_execute(&self, ctx: &ExecContext<'_>) {
        if self.verbosity == TraceVerbosity::Basic {
            let mut sink = self.sink.borrow_mut();
            let _ = writeln!(sink, "0x{:08x}: 0x{:08x} {}", ctx.pc, ctx.word, ctx.inst);
        }
    }

    fn post_execute(&self, ctx: &ExecContext<'_>) {
        if self.verbosity != TraceVerbosity::Semantic {
            return;
        }

        let mut detail = String::new();
        for reg in written_registers(ctx.inst) {
            detail.push_str(&format!(" {}=0x{:08x}", reg, ctx.regs.read(reg)));
        }

        let mut pending = self.pending.borrow_mut();
        if let Some((addr, value)) = pending.read.take() {
            detail.push_str(&format!(" mem[0x{:08x}]->0x{:08x}", addr, value));
        }
        if let Some((addr, value)) = pending.write.take() {
            detail.push_str(&format!(" mem[0x{:08x}]<-0x{:08x}", addr, value));
        }

        let mut sink = self.sink.borrow_mut();
        let _ = writeln!(
            sink,
            "0x{:08x}: 0x{:08x} {}{}",
            ctx.pc, ctx.word, ctx.inst, detail
        );
    }

    fn on_memory_read(&self, addr: Address, value: Word) {
        if self.verbosity == TraceVerbosity::Semantic {
            self.pending.borrow_mut().read = Some((addr, value));
        }
    }

    fn on_memory_write(&self, addr: Address, value: Word) {
        if self.verbosity == TraceVerbosity::Semantic {
            self.pending.borrow_mut().write = Some((addr, value));
        }
    }

    fn on_halt(&self) {
        let mut sink = self.sink.borrow_mut();
        let _ = writeln!(sink, "; vm halted");
    }
}
