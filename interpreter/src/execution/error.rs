use thiserror::Error;

use crate::{memory::MemoryError, program::Operand};

/// Errors surfaced by loading, stepping or resuming the interpreter.
///
/// None of them leave a step partially applied: the interpreter state after
/// an error is exactly the state before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    #[error("could not find entrypoint: {0}")]
    EntrypointNotFound(String),

    #[error("unknown register: {0}")]
    UnknownRegister(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("program counter out of range: {pc} of {len}")]
    ProgramCounterOutOfRange { pc: i64, len: usize },

    #[error("unsupported variable type: {0}")]
    UnsupportedVariableKind(String),

    #[error("invalid value for variable {name}: {reason}")]
    InvalidVariableValue { name: String, reason: &'static str },

    #[error("invalid operands for {opcode}: {operands:?}")]
    InvalidOperands {
        opcode: &'static str,
        operands: Vec<Operand>,
    },

    #[error("unsupported instruction: {0}")]
    UnsupportedInstruction(String),

    #[error("unknown label: {0}")]
    UnknownLabel(String),

    #[error("unsupported syscall code: {0}")]
    UnsupportedSyscall(i32),

    #[error("division by zero")]
    DivisionByZero,

    #[error("the program has halted")]
    Halted,

    #[error("no input was requested")]
    NotInterrupted,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl InterpreterError {
    /// Whether the host may retry the failing call with corrected input.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
