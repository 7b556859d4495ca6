//! MipsVM interpreter core.
//!
//! Executes a structured MIPS-like program one statement at a time. Every
//! state change of a step is reported through a [`Patch`], which is the only
//! channel a host needs to keep its own copy of registers and memory in sync.

mod config;
mod decode;
mod execution;
mod memory;
mod opcodes;
mod program;
mod registers;
mod stats;
mod util;

pub use config::{VmConfig, DEFAULT_MEMORY_SIZE, DEFAULT_STACK_SIZE};
pub use execution::{
    ExecutionStatus, Input, InputRequest, Interpreter, InterpreterError, Patch, RunHandle,
    RunOptions, RunOutcome, SyscallCode,
};
pub use memory::{decode_cstring, encode_asciiz, Memory, MemoryError};
pub use opcodes::Opcode;
pub use program::{
    DataSection, Instruction, Operand, Program, Statement, TextSection, Variable, VariableValue,
};
pub use registers::{Register, RegisterFile, REGISTER_COUNT};
pub use stats::ExecutionStats;
pub use util::init_logger;
