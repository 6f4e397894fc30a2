//! Register definitions for the IRRE architecture

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Total number of register slots (32 GPRs + 5 special)
pub const NUM_REGISTERS: usize = 37;

/// IRRE register (r0-r31 plus pc, lr, ad, at, sp)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    R0 = 0x00,
    R1 = 0x01,
    R2 = 0x02,
    R3 = 0x03,
    R4 = 0x04,
    R5 = 0x05,
    R6 = 0x06,
    R7 = 0x07,
    R8 = 0x08,
    R9 = 0x09,
    R10 = 0x0A,
    R11 = 0x0B,
    R12 = 0x0C,
    R13 = 0x0D,
    R14 = 0x0E,
    R15 = 0x0F,
    R16 = 0x10,
    R17 = 0x11,
    R18 = 0x12,
    R19 = 0x13,
    R20 = 0x14,
    R21 = 0x15,
    R22 = 0x16,
    R23 = 0x17,
    R24 = 0x18,
    R25 = 0x19,
    R26 = 0x1A,
    R27 = 0x1B,
    R28 = 0x1C,
    R29 = 0x1D,
    R30 = 0x1E,
    R31 = 0x1F,

    /// Program counter
    Pc = 0x20,
    /// Link register (return address)
    Lr = 0x21,
    /// Address temporary (assembler-reserved)
    Ad = 0x22,
    /// Arithmetic temporary (assembler-reserved)
    At = 0x23,
    /// Stack pointer
    Sp = 0x24,
}

impl Register {
    /// Highest valid register encoding (sp)
    pub const MAX_INDEX: u8 = 0x24;

    /// Try to convert from the register byte in an instruction word
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Register::R0),
            0x01 => Some(Register::R1),
            0x02 => Some(Register::R2),
            0x03 => Some(Register::R3),
            0x04 => Some(Register::R4),
            0x05 => Some(Register::R5),
            0x06 => Some(Register::R6),
            0x07 => Some(Register::R7),
            0x08 => Some(Register::R8),
            0x09 => Some(Register::R9),
            0x0A => Some(Register::R10),
            0x0B => Some(Register::R11),
            0x0C => Some(Register::R12),
            0x0D => Some(Register::R13),
            0x0E => Some(Register::R14),
            0x0F => Some(Register::R15),
            0x10 => Some(Register::R16),
            0x11 => Some(Register::R17),
            0x12 => Some(Register::R18),
            0x13 => Some(Register::R19),
            0x14 => Some(Register::R20),
            0x15 => Some(Register::R21),
            0x16 => Some(Register::R22),
            0x17 => Some(Register::R23),
            0x18 => Some(Register::R24),
            0x19 => Some(Register::R25),
            0x1A => Some(Register::R26),
            0x1B => Some(Register::R27),
            0x1C => Some(Register::R28),
            0x1D => Some(Register::R29),
            0x1E => Some(Register::R30),
            0x1F => Some(Register::R31),
            0x20 => Some(Register::Pc),
            0x21 => Some(Register::Lr),
            0x22 => Some(Register::Ad),
            0x23 => Some(Register::At),
            0x24 => Some(Register::Sp),
            _ => None,
        }
    }

    /// Convert to the register byte used in instruction words
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Index into the register file
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// General-purpose register (r0-r31)?
    #[inline]
    pub const fn is_gpr(self) -> bool {
        (self as u8) <= 0x1F
    }

    /// Special register (pc, lr, ad, at, sp)?
    #[inline]
    pub const fn is_special(self) -> bool {
        (self as u8) >= 0x20
    }

    /// Canonical lowercase register name
    pub fn name(self) -> &'static str {
        match self {
            Register::R0 => "r0",
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::R6 => "r6",
            Register::R7 => "r7",
            Register::R8 => "r8",
            Register::R9 => "r9",
            Register::R10 => "r10",
            Register::R11 => "r11",
            Register::R12 => "r12",
            Register::R13 => "r13",
            Register::R14 => "r14",
            Register::R15 => "r15",
            Register::R16 => "r16",
            Register::R17 => "r17",
            Register::R18 => "r18",
            Register::R19 => "r19",
            Register::R20 => "r20",
            Register::R21 => "r21",
            Register::R22 => "r22",
            Register::R23 => "r23",
            Register::R24 => "r24",
            Register::R25 => "r25",
            Register::R26 => "r26",
            Register::R27 => "r27",
            Register::R28 => "r28",
            Register::R29 => "r29",
            Register::R30 => "r30",
            Register::R31 => "r31",
            Register::Pc => "pc",
            Register::Lr => "lr",
            Register::Ad => "ad",
            Register::At => "at",
            Register::Sp => "sp",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Register {
    type Err = ();

    /// Parse a canonical register name (`r0`..`r31`, `pc`, `lr`, `ad`, `at`, `sp`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pc" => return Ok(Register::Pc),
            "lr" => return Ok(Register::Lr),
            "ad" => return Ok(Register::Ad),
            "at" => return Ok(Register::At),
            "sp" => return Ok(Register::Sp),
            _ => {}
        }
        let digits = s.strip_prefix('r').ok_or(())?;
        // reject "r07"-style forms so names stay canonical
        if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
            return Err(());
        }
        let n: u8 = digits.parse().map_err(|_| ())?;
        if n <= 31 {
            Register::from_u8(n).ok_or(())
        } else {
            Err(())
        }
    }
}
