//! IRRE emulator CLI: load an object file and run it against the
//! console device. Exit code 0 iff the VM halts normally.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use irre_runtime::{
    device_ids, ConsoleDevice, DeviceRegistry, ExecutionState, TraceObserver, TraceVerbosity, Vm,
};
use irre_spec::{ObjectFile, DEFAULT_MEMORY_SIZE};

#[derive(Clone, Copy, ValueEnum)]
enum TraceLevel {
    Basic,
    Semantic,
}

#[derive(Parser)]
#[command(version, about = "Run an IRRE object file")]
struct Cli {
    /// Object file to execute
    input: PathBuf,

    /// Memory size in bytes
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Stop after this many instructions (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    max_instructions: u64,

    /// Per-instruction execution trace
    #[arg(long, value_enum)]
    trace: Option<TraceLevel>,
}

fn read_object(path: &Path) -> anyhow::Result<ObjectFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let object = ObjectFile::from_binary(&bytes)
        .with_context(|| format!("cannot load {}", path.display()))?;
    Ok(object)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let object = match read_object(&cli.input) {
        Ok(object) => object,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut vm = Vm::new(cli.memory_size);

    if let Some(level) = cli.trace {
        let verbosity = match level {
            TraceLevel::Basic => TraceVerbosity::Basic,
            TraceLevel::Semantic => TraceVerbosity::Semantic,
        };
        vm.add_observer(Rc::new(TraceObserver::with_sink(
            verbosity,
            Box::new(std::io::stderr()),
        )));
    }

    // console device behind the snd opcode
    let console = ConsoleDevice::new();
    let console_output = console.output();
    let registry = Rc::new(RefCell::new(DeviceRegistry::new()));
    registry
        .borrow_mut()
        .register(device_ids::CONSOLE, Box::new(console));

    let registry_handle = Rc::clone(&registry);
    vm.on_device_access(move |device_id, command, argument| {
        registry_handle
            .borrow_mut()
            .access(device_id, command, argument)
    });

    if let Err(fault) = vm.load_object(&object) {
        eprintln!("error: {}", fault);
        return ExitCode::FAILURE;
    }

    let final_state = vm.run(cli.max_instructions);

    // accumulated console output goes to stdout after execution
    print!("{}", console_output.borrow());

    match final_state {
        ExecutionState::Halted => ExitCode::SUCCESS,
        ExecutionState::Running => {
            eprintln!(
                "warning: stopped after {} instructions without halting",
                vm.instruction_count()
            );
            ExitCode::FAILURE
        }
        ExecutionState::Error => {
            if let Some(fault) = vm.last_fault() {
                eprintln!("error: {}", fault);
            }
            ExitCode::FAILURE
        }
    }
}
