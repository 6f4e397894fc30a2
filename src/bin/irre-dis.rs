//! IRRE disassembler CLI: object file or raw word stream to listing.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use irre_disassembler::{Disassembler, ListingFormat};
use irre_spec::ObjectFile;

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Basic,
    Annotated,
}

impl From<Format> for ListingFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Basic => ListingFormat::Basic,
            Format::Annotated => ListingFormat::Annotated,
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Disassemble an IRRE object file or raw instruction stream")]
struct Cli {
    /// Object file (detected by magic) or raw instruction bytes
    input: PathBuf,

    /// Write the listing to a file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Listing format
    #[arg(short, long, value_enum, default_value = "annotated")]
    format: Format,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;

    let disasm = Disassembler::new();
    let format = cli.format.into();

    // object file by magic, else raw words
    let listing = match ObjectFile::from_binary(&bytes) {
        Ok(object) => disasm.disassemble_object(&object, format),
        Err(_) => disasm.disassemble_bytes(&bytes, format),
    }
    .with_context(|| format!("cannot disassemble {}", cli.input.display()))?;

    match cli.output {
        Some(path) => std::fs::write(&path, listing)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => println!("{}", listing),
    }

    Ok(())
}
