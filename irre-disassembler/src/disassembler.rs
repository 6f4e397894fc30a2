//! Listing generation
//!
//! Decodes a code section or raw byte stream 4 bytes at a time. A word
//! that fails to decode produces one inline error comment and decoding
//! continues with the next word.

use crate::error::{DisassemblerError, Result};
use crate::formatter::DisasmOptions;
use irre_spec::encoding::decode;
use irre_spec::{Address, ObjectFile};

/// Listing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingFormat {
    /// Plain assembly text only
    Basic,
    /// Header comments, addresses, hex bytes, and a data dump
    #[default]
    Annotated,
}

/// Main disassembler
#[derive(Debug, Default)]
pub struct Disassembler {
    options: DisasmOptions,
}

impl Disassembler {
    pub fn new() -> Self {
        Disassembler {
            options: DisasmOptions::default(),
        }
    }

    pub fn with_options(options: DisasmOptions) -> Self {
        Disassembler { options }
    }

    pub fn options(&self) -> &DisasmOptions {
        &self.options
    }

    /// Disassemble an object file's code section.
    ///
    /// Annotated output carries a header comment block (entry offset,
    /// code size with instruction count, data size) and a trailing raw
    /// dump of the data section, 16 bytes per line.
    pub fn disassemble_object(&self, obj: &ObjectFile, fmt: ListingFormat) -> Result<String> {
        if obj.code.len() % 4 != 0 {
            return Err(DisassemblerError::InvalidSize(obj.code.len()));
        }

        let mut out = String::new();

        if fmt == ListingFormat::Annotated {
            out.push_str("; irre object file disassembly\n");
            out.push_str(&format!("; entry point: 0x{:x}\n", obj.entry_offset));
            out.push_str(&format!(
                "; code size: {} bytes ({} instructions)\n",
                obj.code.len(),
                obj.code.len() / 4
            ));
            if !obj.data.is_empty() {
                out.push_str(&format!("; data size: {} bytes\n", obj.data.len()));
            }
            out.push('\n');
        }

        out.push_str(&self.listing(&obj.code, 0, fmt));

        if !obj.data.is_empty() && fmt == ListingFormat::Annotated {
            out.push_str(&format!(
                "\n\n; data section ({} bytes)\n",
                obj.data.len()
            ));
            out.push_str(&self.data_dump(&obj.data, obj.code.len() as Address));
        }

        Ok(out)
    }

    /// Disassemble a raw byte stream; length must be a multiple of 4
    pub fn disassemble_bytes(&self, bytes: &[u8], fmt: ListingFormat) -> Result<String> {
        if bytes.is_empty() {
            return Ok(String::new());
        }
        if bytes.len() % 4 != 0 {
            return Err(DisassemblerError::InvalidSize(bytes.len()));
        }

        let mut out = String::new();

        if fmt == ListingFormat::Annotated {
            out.push_str("; raw bytes disassembly\n");
            out.push_str(&format!("; base address: 0x{:x}\n", self.options.base_address));
            out.push_str(&format!(
                "; size: {} bytes ({} instructions)\n\n",
                bytes.len(),
                bytes.len() / 4
            ));
        }

        out.push_str(&self.listing(bytes, self.options.base_address, fmt));
        Ok(out)
    }

    /// Core loop: one line per 4-byte word, inline error lines for
    /// words that do not decode
    fn listing(&self, bytes: &[u8], base: Address, fmt: ListingFormat) -> String {
        let mut lines = Vec::with_capacity(bytes.len() / 4);

        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            let addr = base + (i as Address) * 4;
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

            let assembly = match decode(word) {
                Ok(inst) => inst.to_string(),
                Err(err) => format!(
                    "; ERROR: {} (0x{:08x} = {:02x} {:02x} {:02x} {:02x})",
                    err, word, chunk[0], chunk[1], chunk[2], chunk[3]
                ),
            };

            let line = match fmt {
                ListingFormat::Basic => assembly,
                ListingFormat::Annotated => self.options.format_line(addr, chunk, &assembly),
            };
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Raw hex dump of the data section, 16 bytes per line
    fn data_dump(&self, data: &[u8], base: Address) -> String {
        let mut lines = Vec::new();
        for (i, chunk) in data.chunks(16).enumerate() {
            let addr = base + (i as Address) * 16;
            let hex: String = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            lines.push(format!("{}: {}", self.options.format_address(addr), hex));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irre_spec::encoding::encode_all;
    use irre_spec::{Instruction, Register};

    fn code(instructions: &[Instruction]) -> Vec<u8> {
        encode_all(instructions)
    }

    #[test]
    fn test_basic_listing() {
        let bytes = code(&[
            Instruction::set(Register::R0, 0x2A),
            Instruction::set(Register::R1, 100),
            Instruction::add(Register::R2, Register::R0, Register::R1),
            Instruction::hlt(),
        ]);
        let listing = Disassembler::new()
            .disassemble_bytes(&bytes, ListingFormat::Basic)
            .unwrap();
        assert_eq!(
            listing,
            "set r0 0x002a\nset r1 0x0064\nadd r2 r0 r1\nhlt"
        );
    }

    #[test]
    fn test_annotated_listing_columns() {
        let bytes = code(&[Instruction::hlt()]);
        let listing = Disassembler::new()
            .disassemble_bytes(&bytes, ListingFormat::Annotated)
            .unwrap();
        assert!(listing.contains("0x0000: 000000ff  hlt"));
        assert!(listing.contains("; raw bytes disassembly"));
        assert!(listing.contains("; size: 4 bytes (1 instructions)"));
    }

    #[test]
    fn test_object_header_comments() {
        let obj = ObjectFile {
            entry_offset: 4,
            code: code(&[Instruction::nop(), Instruction::hlt()]),
            data: vec![1, 2, 3],
        };
        let listing = Disassembler::new()
            .disassemble_object(&obj, ListingFormat::Annotated)
            .unwrap();
        assert!(listing.contains("; entry point: 0x4"));
        assert!(listing.contains("; code size: 8 bytes (2 instructions)"));
        assert!(listing.contains("; data size: 3 bytes"));
        assert!(listing.contains("; data section (3 bytes)"));
        assert!(listing.contains("0x0008: 010203"));
    }

    #[test]
    fn test_invalid_word_gets_inline_error() {
        // 0x11 is not an opcode; bytes are LE so the opcode is the last byte
        let mut bytes = code(&[Instruction::nop()]);
        bytes.extend_from_slice(&[0x78, 0x56, 0x34, 0x11]);
        bytes.extend_from_slice(&code(&[Instruction::hlt()]));

        let listing = Disassembler::new()
            .disassemble_bytes(&bytes, ListingFormat::Basic)
            .unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "nop");
        assert_eq!(
            lines[1],
            "; ERROR: invalid opcode 0x11 (0x11345678 = 78 56 34 11)"
        );
        assert_eq!(lines[2], "hlt");
    }

    #[test]
    fn test_invalid_register_error_line() {
        // mov with A field 0x30
        let bytes = 0x0C30_0000u32.to_le_bytes();
        let listing = Disassembler::new()
            .disassemble_bytes(&bytes, ListingFormat::Basic)
            .unwrap();
        assert!(listing.starts_with("; ERROR: invalid register 0x30"));
    }

    #[test]
    fn test_length_must_be_word_multiple() {
        let err = Disassembler::new()
            .disassemble_bytes(&[0, 0, 0], ListingFormat::Basic)
            .unwrap_err();
        assert_eq!(err, DisassemblerError::InvalidSize(3));
    }

    #[test]
    fn test_empty_input() {
        let listing = Disassembler::new()
            .disassemble_bytes(&[], ListingFormat::Annotated)
            .unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn test_base_address_offsets_listing() {
        let opts = DisasmOptions {
            base_address: 0x100,
            ..Default::default()
        };
        let bytes = code(&[Instruction::nop(), Instruction::nop()]);
        let listing = Disassembler::with_options(opts)
            .disassemble_bytes(&bytes, ListingFormat::Annotated)
            .unwrap();
        assert!(listing.contains("0x0100: "));
        assert!(listing.contains("0x0104: "));
    }
}
