//! Listing column formatting
//!
//! Builds the optional address and hex-byte columns in front of the
//! assembly text. Hex bytes print in file order (little-endian), so a
//! listing line shows exactly what is on disk.

use irre_spec::Address;

/// How to print the address column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFormat {
    /// `0x0010`
    #[default]
    Hex,
    /// Width-8 right-aligned decimal
    Decimal,
}

/// Disassembler configuration options
#[derive(Debug, Clone)]
pub struct DisasmOptions {
    /// Show the instruction address column
    pub show_addresses: bool,
    /// Show the raw hex bytes column
    pub show_hex_bytes: bool,
    /// Address rendering style
    pub address_format: AddressFormat,
    /// Base address for raw byte disassembly
    pub base_address: Address,
}

impl Default for DisasmOptions {
    fn default() -> Self {
        DisasmOptions {
            show_addresses: true,
            show_hex_bytes: true,
            address_format: AddressFormat::Hex,
            base_address: 0,
        }
    }
}

impl DisasmOptions {
    pub fn format_address(&self, addr: Address) -> String {
        match self.address_format {
            AddressFormat::Hex => format!("0x{:04x}", addr),
            AddressFormat::Decimal => format!("{:8}", addr),
        }
    }

    /// Hex bytes in the exact order they appear in the file
    pub fn format_hex_bytes(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// One annotated listing line: address, hex bytes, assembly
    pub fn format_line(&self, addr: Address, bytes: &[u8], assembly: &str) -> String {
        let mut line = String::new();
        if self.show_addresses {
            line.push_str(&self.format_address(addr));
            line.push_str(": ");
        }
        if self.show_hex_bytes {
            line.push_str(&self.format_hex_bytes(bytes));
            line.push_str("  ");
        }
        line.push_str(assembly);
        line
    }
}
