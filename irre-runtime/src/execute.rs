//! Instruction dispatch
//!
//! Executes one decoded instruction against VM state. All arithmetic
//! is modulo 2^32. PC advancement is the caller's concern: branches
//! and jumps write PC here, and `Vm::step` advances by 4 only when PC
//! is untouched.

use crate::error::{Fault, OutOfBounds, RuntimeErrorKind};
use crate::vm::Vm;
use irre_spec::encoding::encode;
use irre_spec::{Instruction, Opcode, Word};

impl Vm {
    /// Dispatch a single instruction.
    ///
    /// Memory-read and memory-write observer hooks fire at the moment
    /// of each access.
    pub(crate) fn execute(&mut self, inst: &Instruction) -> Result<(), Fault> {
        match *inst {
            Instruction::Op { op } => match op {
                Opcode::Nop => Ok(()),

                Opcode::Ret => {
                    // pc = lr; lr = 0
                    let lr = self.state.registers.lr();
                    self.state.registers.set_pc(lr);
                    self.state.registers.set_lr(0);
                    Ok(())
                }

                Opcode::Hlt => {
                    self.state.set_state(crate::state::ExecutionState::Halted);
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpReg { op, a } => match op {
                Opcode::Jmp => {
                    let target = self.state.registers.read(a);
                    self.state.registers.set_pc(target);
                    Ok(())
                }

                Opcode::Cal => {
                    // lr = pc + 4; pc = rA
                    let pc = self.state.registers.pc();
                    let target = self.state.registers.read(a);
                    self.state.registers.set_lr(pc.wrapping_add(4));
                    self.state.registers.set_pc(target);
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpImm24 { op, addr } => match op {
                Opcode::Jmi => {
                    self.state.registers.set_pc(addr);
                    Ok(())
                }

                Opcode::Int => {
                    self.raise_interrupt(addr);
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpRegImm16 { op, a, imm } => match op {
                Opcode::Set => {
                    // zero-extended immediate
                    self.state.registers.write(a, imm as Word);
                    Ok(())
                }

                Opcode::Sup => {
                    let current = self.state.registers.read(a);
                    let value = (current & 0xFFFF) | ((imm as Word) << 16);
                    self.state.registers.write(a, value);
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpRegReg { op, a, b } => match op {
                Opcode::Mov => {
                    let value = self.state.registers.read(b);
                    self.state.registers.write(a, value);
                    Ok(())
                }

                Opcode::Not => {
                    let value = !self.state.registers.read(b);
                    self.state.registers.write(a, value);
                    Ok(())
                }

                Opcode::Sxt => {
                    // sign-extend the low 16 bits of rB
                    let value = self.state.registers.read(b) as u16 as i16 as i32 as Word;
                    self.state.registers.write(a, value);
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpRegRegImm8 { op, a, b, imm } => {
                match op {
                    Opcode::Ldw => {
                        let addr = self.effective_address(b, imm);
                        let value = self
                            .memory
                            .read_word(addr)
                            .map_err(|e| self.memory_fault(inst, e))?;
                        self.notify_memory_read(addr, value);
                        self.state.registers.write(a, value);
                        Ok(())
                    }

                    Opcode::Stw => {
                        let addr = self.effective_address(b, imm);
                        let value = self.state.registers.read(a);
                        self.memory
                            .write_word(addr, value)
                            .map_err(|e| self.memory_fault(inst, e))?;
                        self.notify_memory_write(addr, value);
                        Ok(())
                    }

                    Opcode::Ldb => {
                        let addr = self.effective_address(b, imm);
                        let byte = self
                            .memory
                            .read_byte(addr)
                            .map_err(|e| self.memory_fault(inst, e))?;
                        self.notify_memory_read(addr, byte as Word);
                        self.state.registers.write(a, byte as Word);
                        Ok(())
                    }

                    Opcode::Stb => {
                        let addr = self.effective_address(b, imm);
                        let byte = (self.state.registers.read(a) & 0xFF) as u8;
                        self.memory
                            .write_byte(addr, byte)
                            .map_err(|e| self.memory_fault(inst, e))?;
                        self.notify_memory_write(addr, byte as Word);
                        Ok(())
                    }

                    Opcode::Bve => {
                        // if rB == imm then pc = rA
                        if self.state.registers.read(b) == imm as Word {
                            let target = self.state.registers.read(a);
                            self.state.registers.set_pc(target);
                        }
                        Ok(())
                    }

                    Opcode::Bvn => {
                        if self.state.registers.read(b) != imm as Word {
                            let target = self.state.registers.read(a);
                            self.state.registers.set_pc(target);
                        }
                        Ok(())
                    }

                    Opcode::Seq => {
                        let value = (self.state.registers.read(b) == imm as Word) as Word;
                        self.state.registers.write(a, value);
                        Ok(())
                    }

                    _ => Err(self.bad_pairing(inst)),
                }
            }

            Instruction::OpRegImm8x2 { op, a, v0, v1 } => match op {
                Opcode::Sia => {
                    // rA += v0 << v1
                    let current = self.state.registers.read(a);
                    let shifted = (v0 as Word).checked_shl(v1 as u32).unwrap_or(0);
                    self.state.registers.write(a, current.wrapping_add(shifted));
                    Ok(())
                }

                _ => Err(self.bad_pairing(inst)),
            },

            Instruction::OpRegRegReg { op, a, b, c } => {
                let b_val = self.state.registers.read(b);
                let c_val = self.state.registers.read(c);

                let result = match op {
                    Opcode::Add => b_val.wrapping_add(c_val),
                    Opcode::Sub => b_val.wrapping_sub(c_val),
                    Opcode::Mul => b_val.wrapping_mul(c_val),

                    Opcode::Div => {
                        if c_val == 0 {
                            return Err(self.arithmetic_fault(inst, "divisor is zero"));
                        }
                        b_val / c_val
                    }

                    Opcode::Mod => {
                        if c_val == 0 {
                            return Err(self.arithmetic_fault(inst, "divisor is zero"));
                        }
                        b_val % c_val
                    }

                    Opcode::And => b_val & c_val,
                    Opcode::Orr => b_val | c_val,
                    Opcode::Xor => b_val ^ c_val,

                    Opcode::Lsh => {
                        let shift = c_val as i32;
                        if !(-32..=32).contains(&shift) {
                            return Err(self.shift_fault(inst, shift));
                        }
                        if shift >= 0 {
                            b_val.checked_shl(shift as u32).unwrap_or(0)
                        } else {
                            b_val.checked_shr((-shift) as u32).unwrap_or(0)
                        }
                    }

                    Opcode::Ash => {
                        let shift = c_val as i32;
                        if !(-32..=32).contains(&shift) {
                            return Err(self.shift_fault(inst, shift));
                        }
                        if shift >= 0 {
                            (b_val as i32).checked_shl(shift as u32).unwrap_or(0) as Word
                        } else if shift == -32 {
                            // full-width arithmetic right shift keeps the sign fill
                            ((b_val as i32) >> 31) as Word
                        } else {
                            ((b_val as i32) >> ((-shift) as u32)) as Word
                        }
                    }

                    Opcode::Tcu => {
                        // sign(b - c), unsigned compare
                        match b_val.cmp(&c_val) {
                            std::cmp::Ordering::Less => Word::MAX,
                            std::cmp::Ordering::Greater => 1,
                            std::cmp::Ordering::Equal => 0,
                        }
                    }

                    Opcode::Tcs => match (b_val as i32).cmp(&(c_val as i32)) {
                        std::cmp::Ordering::Less => Word::MAX,
                        std::cmp::Ordering::Greater => 1,
                        std::cmp::Ordering::Equal => 0,
                    },

                    Opcode::Snd => {
                        // rC = device(rA, rB, rC)
                        let device_id = self.state.registers.read(a);
                        let result = self.device_access(device_id, b_val, c_val);
                        self.state.registers.write(c, result);
                        return Ok(());
                    }

                    _ => return Err(self.bad_pairing(inst)),
                };

                self.state.registers.write(a, result);
                Ok(())
            }
        }
    }

    /// rB + sign-extended 8-bit offset, wrapping
    fn effective_address(&self, base: irre_spec::Register, offset: u8) -> Word {
        let base_val = self.state.registers.read(base);
        base_val.wrapping_add(offset as i8 as i32 as Word)
    }

    fn memory_fault(&self, inst: &Instruction, err: OutOfBounds) -> Fault {
        Fault::new(
            RuntimeErrorKind::InvalidMemoryAccess,
            self.state.registers.pc(),
            Some(encode(inst)),
            err.to_string(),
        )
    }

    fn arithmetic_fault(&self, inst: &Instruction, message: &str) -> Fault {
        Fault::new(
            RuntimeErrorKind::DivisionByZero,
            self.state.registers.pc(),
            Some(encode(inst)),
            message,
        )
    }

    fn shift_fault(&self, inst: &Instruction, shift: i32) -> Fault {
        Fault::new(
            RuntimeErrorKind::InvalidInstruction,
            self.state.registers.pc(),
            Some(encode(inst)),
            format!("shift amount {} out of range [-32, 32]", shift),
        )
    }

    /// Opcode/format pairing that the decoder would never produce
    fn bad_pairing(&self, inst: &Instruction) -> Fault {
        Fault::new(
            RuntimeErrorKind::InvalidInstruction,
            self.state.registers.pc(),
            Some(encode(inst)),
            format!(
                "opcode '{}' does not belong to this instruction format",
                inst.opcode()
            ),
        )
    }
}
