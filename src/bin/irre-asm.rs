//! IRRE assembler CLI: one source file in, one object file out.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Assemble IRRE source into an object file")]
struct Cli {
    /// Assembly source file
    input: PathBuf,

    /// Output object file (defaults to the input with a `.o` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;

    let object = irre_assembler::assemble(&source)
        .map_err(|err| anyhow::anyhow!("{}: {}", cli.input.display(), err))?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("o"));

    std::fs::write(&output, object.to_binary())
        .with_context(|| format!("cannot write {}", output.display()))?;

    Ok(())
}
