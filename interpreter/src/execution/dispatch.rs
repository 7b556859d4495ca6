use tracing::warn;

use super::{context::StepContext, InterpreterError};
use crate::{
    decode::{ArithmeticOp, JumpTarget, Operation},
    registers::Register,
};

impl StepContext<'_> {
    /// Executes one decoded instruction.
    ///
    /// The pc has already been advanced past the instruction; jumps and taken
    /// branches override it.
    pub(crate) fn execute(&mut self, operation: Operation<'_>) -> Result<(), InterpreterError> {
        match operation {
            Operation::LoadImmediate { dst, imm } => self.set_register(dst, imm),
            Operation::LoadAddress { dst, variable } => {
                let address = self.variable_address(variable)?;
                self.set_register(dst, address);
            }
            Operation::Move { dst, src } => {
                let value = self.register(src);
                self.set_register(dst, value);
            }
            Operation::Arithmetic { op, dst, lhs, rhs } => {
                let (lhs, rhs) = (self.value(lhs), self.value(rhs));
                let result = match op {
                    ArithmeticOp::Add => lhs.wrapping_add(rhs),
                    ArithmeticOp::Sub => lhs.wrapping_sub(rhs),
                    ArithmeticOp::Mul => lhs.wrapping_mul(rhs),
                    ArithmeticOp::Div => {
                        if rhs == 0 {
                            return Err(InterpreterError::DivisionByZero);
                        }
                        // Rust integer division already truncates toward zero.
                        lhs.wrapping_div(rhs)
                    }
                    ArithmeticOp::And => lhs & rhs,
                };
                self.set_register(dst, result);
            }
            Operation::Set { cmp, dst, lhs, rhs } => {
                let holds = cmp.holds(self.value(lhs), self.value(rhs));
                self.set_register(dst, holds as i32);
            }
            Operation::Jump { target } => match target {
                JumpTarget::Label(label) => {
                    let position = self.label_position(label)?;
                    self.jump_to(position + 1);
                }
                JumpTarget::Index(index) => {
                    let len = self.statement_count();
                    match usize::try_from(index) {
                        Ok(pc) if pc < len => self.jump_to(pc),
                        _ => {
                            return Err(InterpreterError::ProgramCounterOutOfRange {
                                pc: index.into(),
                                len,
                            })
                        }
                    }
                }
            },
            Operation::JumpAndLink { label } => {
                let position = self.label_position(label)?;
                self.set_register(Register::Ra, self.next_pc() as i32);
                self.jump_to(position);
            }
            Operation::JumpRegister { src } => {
                let target = self.register(src);
                let pc = usize::try_from(target).map_err(|_| {
                    InterpreterError::ProgramCounterOutOfRange {
                        pc: target.into(),
                        len: self.statement_count(),
                    }
                })?;
                self.jump_to(pc);
            }
            Operation::Branch {
                cmp,
                lhs,
                rhs,
                label,
            } => {
                // The label is only looked up when the branch is taken.
                if cmp.holds(self.value(lhs), self.value(rhs)) {
                    let position = self.label_position(label)?;
                    self.jump_to(position + 1);
                }
            }
            Operation::StoreWord {
                src,
                base,
                ignored_offset,
            } => {
                if let Some(offset) = ignored_offset.filter(|&offset| offset != 0) {
                    warn!(offset, base = %base, "sw ignores its address offset");
                }
                let value = self.value(src);
                let address = self.register(base);
                self.write_word(address.into(), value)?;
            }
            Operation::LoadWord { dst, base, offset } => {
                let address = i64::from(self.register(base)) + i64::from(offset);
                let value = self.read_word(address)?;
                self.set_register(dst, value);
            }
            Operation::Syscall => self.syscall()?,
            Operation::Halt => self.halt(),
        }
        Ok(())
    }
}
