//! Decoding of a parsed [`Instruction`] into a typed operation.
//!
//! The mnemonic is mapped onto the closed [`Opcode`] set and the operand list
//! is checked against the shapes that opcode accepts. The dispatcher then
//! matches exhaustively on [`Operation`].

use crate::{
    execution::InterpreterError,
    opcodes::Opcode,
    program::{Instruction, Operand},
    registers::Register,
};

/// A value operand that may be either a register or an immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Reg(Register),
    Imm(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparison {
    pub(crate) const fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JumpTarget<'a> {
    /// Resumes after the label marker.
    Label(&'a str),
    /// An absolute statement index.
    Index(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation<'a> {
    LoadImmediate {
        dst: Register,
        imm: i32,
    },
    LoadAddress {
        dst: Register,
        variable: &'a str,
    },
    Move {
        dst: Register,
        src: Register,
    },
    Arithmetic {
        op: ArithmeticOp,
        dst: Register,
        lhs: Source,
        rhs: Source,
    },
    Set {
        cmp: Comparison,
        dst: Register,
        lhs: Source,
        rhs: Source,
    },
    Jump {
        target: JumpTarget<'a>,
    },
    JumpAndLink {
        label: &'a str,
    },
    JumpRegister {
        src: Register,
    },
    /// Zero-test branches are decoded with `rhs = Imm(0)`.
    Branch {
        cmp: Comparison,
        lhs: Source,
        rhs: Source,
        label: &'a str,
    },
    StoreWord {
        src: Source,
        base: Register,
        /// An offset written in the source; stores do not apply it.
        ignored_offset: Option<i32>,
    },
    LoadWord {
        dst: Register,
        base: Register,
        offset: i32,
    },
    Syscall,
    Halt,
}

fn register(operand: &Operand) -> Option<Result<Register, InterpreterError>> {
    match operand {
        Operand::Register(name) => Some(Register::from_name(name)),
        _ => None,
    }
}

fn source(operand: &Operand) -> Option<Result<Source, InterpreterError>> {
    match operand {
        Operand::Register(name) => Some(Register::from_name(name).map(Source::Reg)),
        Operand::Immediate(imm) => Some(Ok(Source::Imm(*imm))),
        Operand::Label(_) => None,
    }
}

const fn immediate(operand: &Operand) -> Option<i32> {
    match operand {
        Operand::Immediate(imm) => Some(*imm),
        _ => None,
    }
}

fn label(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Label(name) => Some(name.as_str()),
        _ => None,
    }
}

const fn arithmetic_op(opcode: Opcode) -> Option<ArithmeticOp> {
    match opcode {
        Opcode::Add | Opcode::Addi => Some(ArithmeticOp::Add),
        Opcode::Sub => Some(ArithmeticOp::Sub),
        Opcode::Mul => Some(ArithmeticOp::Mul),
        Opcode::Div => Some(ArithmeticOp::Div),
        Opcode::Andi => Some(ArithmeticOp::And),
        _ => None,
    }
}

const fn comparison(opcode: Opcode) -> Option<Comparison> {
    match opcode {
        Opcode::Beqz | Opcode::Beq => Some(Comparison::Eq),
        Opcode::Bnez | Opcode::Bne | Opcode::Sne => Some(Comparison::Ne),
        Opcode::Bltz | Opcode::Blt | Opcode::Slt => Some(Comparison::Lt),
        Opcode::Bgtz | Opcode::Bgt | Opcode::Sgt => Some(Comparison::Gt),
        Opcode::Blez | Opcode::Ble | Opcode::Sle => Some(Comparison::Le),
        Opcode::Bgez | Opcode::Bge | Opcode::Sge => Some(Comparison::Ge),
        _ => None,
    }
}

/// Decodes `instruction`.
///
/// Fails with `UnsupportedInstruction` for an unknown mnemonic and with
/// `InvalidOperands` when the operand list does not match a shape accepted by
/// the opcode.
pub(crate) fn decode(instruction: &Instruction) -> Result<(Opcode, Operation<'_>), InterpreterError> {
    let opcode = Opcode::from_mnemonic(&instruction.opcode)
        .ok_or_else(|| InterpreterError::UnsupportedInstruction(instruction.opcode.clone()))?;
    let invalid = || InterpreterError::InvalidOperands {
        opcode: opcode.mnemonic(),
        operands: instruction.operands.to_vec(),
    };

    let operation = match (opcode, instruction.operands.as_slice()) {
        (Opcode::Li, [dst, imm]) => match (register(dst), immediate(imm)) {
            (Some(dst), Some(imm)) => Operation::LoadImmediate { dst: dst?, imm },
            _ => return Err(invalid()),
        },
        (Opcode::La, [dst, variable]) => match (register(dst), label(variable)) {
            (Some(dst), Some(variable)) => Operation::LoadAddress { dst: dst?, variable },
            _ => return Err(invalid()),
        },
        (Opcode::Move, [dst, src]) => match (register(dst), register(src)) {
            (Some(dst), Some(src)) => Operation::Move {
                dst: dst?,
                src: src?,
            },
            _ => return Err(invalid()),
        },
        (Opcode::Addi | Opcode::Andi, [dst, src, imm]) => {
            match (register(dst), register(src), immediate(imm)) {
                (Some(dst), Some(src), Some(imm)) => Operation::Arithmetic {
                    op: arithmetic_op(opcode).ok_or_else(invalid)?,
                    dst: dst?,
                    lhs: Source::Reg(src?),
                    rhs: Source::Imm(imm),
                },
                _ => return Err(invalid()),
            }
        }
        (Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div, [dst, lhs, rhs]) => {
            match (register(dst), source(lhs), source(rhs)) {
                (Some(dst), Some(lhs), Some(rhs)) => Operation::Arithmetic {
                    op: arithmetic_op(opcode).ok_or_else(invalid)?,
                    dst: dst?,
                    lhs: lhs?,
                    rhs: rhs?,
                },
                _ => return Err(invalid()),
            }
        }
        (
            Opcode::Slt | Opcode::Sgt | Opcode::Sle | Opcode::Sge | Opcode::Sne,
            [dst, lhs, rhs],
        ) => match (register(dst), source(lhs), source(rhs)) {
            (Some(dst), Some(lhs), Some(rhs)) => Operation::Set {
                cmp: comparison(opcode).ok_or_else(invalid)?,
                dst: dst?,
                lhs: lhs?,
                rhs: rhs?,
            },
            _ => return Err(invalid()),
        },
        (Opcode::J, [target]) => match target {
            Operand::Label(name) => Operation::Jump {
                target: JumpTarget::Label(name.as_str()),
            },
            Operand::Immediate(index) => Operation::Jump {
                target: JumpTarget::Index(*index),
            },
            Operand::Register(_) => return Err(invalid()),
        },
        (Opcode::Jal, [target]) => match label(target) {
            Some(label) => Operation::JumpAndLink { label },
            None => return Err(invalid()),
        },
        (Opcode::Jr, [src]) => match register(src) {
            Some(src) => Operation::JumpRegister { src: src? },
            None => return Err(invalid()),
        },
        (
            Opcode::Beqz | Opcode::Bnez | Opcode::Bltz | Opcode::Bgtz | Opcode::Blez | Opcode::Bgez,
            [src, target],
        ) => match (register(src), label(target)) {
            (Some(src), Some(label)) => Operation::Branch {
                cmp: comparison(opcode).ok_or_else(invalid)?,
                lhs: Source::Reg(src?),
                rhs: Source::Imm(0),
                label,
            },
            _ => return Err(invalid()),
        },
        (
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt | Opcode::Ble | Opcode::Bge,
            [lhs, rhs, target],
        ) => match (source(lhs), source(rhs), label(target)) {
            (Some(lhs), Some(rhs), Some(label)) => Operation::Branch {
                cmp: comparison(opcode).ok_or_else(invalid)?,
                lhs: lhs?,
                rhs: rhs?,
                label,
            },
            _ => return Err(invalid()),
        },
        (Opcode::Sw, [src, base]) => match (source(src), register(base)) {
            (Some(src), Some(base)) => Operation::StoreWord {
                src: src?,
                base: base?,
                ignored_offset: None,
            },
            _ => return Err(invalid()),
        },
        (Opcode::Sw, [src, offset, base]) => {
            match (source(src), immediate(offset), register(base)) {
                (Some(src), Some(offset), Some(base)) => Operation::StoreWord {
                    src: src?,
                    base: base?,
                    ignored_offset: Some(offset),
                },
                _ => return Err(invalid()),
            }
        }
        (Opcode::Lw, [dst, offset, base]) => {
            match (register(dst), immediate(offset), register(base)) {
                (Some(dst), Some(offset), Some(base)) => Operation::LoadWord {
                    dst: dst?,
                    base: base?,
                    offset,
                },
                _ => return Err(invalid()),
            }
        }
        (Opcode::Lw, [dst, base]) => match (register(dst), register(base)) {
            (Some(dst), Some(base)) => Operation::LoadWord {
                dst: dst?,
                base: base?,
                offset: 0,
            },
            _ => return Err(invalid()),
        },
        (Opcode::Syscall, []) => Operation::Syscall,
        (Opcode::Halt, []) => Operation::Halt,
        _ => return Err(invalid()),
    };

    Ok((opcode, operation))
}
