use std::fmt;

use super::InterpreterError;
use crate::{memory::Memory, registers::RegisterFile};

/// What a pending input syscall is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRequest {
    /// `read-int`: the value lands in `$v0`.
    Integer,
    /// `read-string`: at most `length - 1` bytes land in the buffer at
    /// `buffer`, followed by a newline if room remains and a null byte.
    Text { buffer: u32, length: i32 },
}

impl fmt::Display for InputRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "an integer"),
            Self::Text { length, .. } => write!(f, "a string of at most {length} bytes"),
        }
    }
}

/// Externally supplied value resuming an interrupted program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Integer(i32),
    Text(String),
}

/// The status of the control state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Program loaded, no statement executed yet.
    Loaded,
    Running,
    /// Blocked on an input syscall until input is provided.
    Interrupted(InputRequest),
    /// Terminal.
    Halted,
}

/// The changes made by a single step.
///
/// Applying `register_patch` and `memory_patch` in order to a copy of the
/// previous state yields the interpreter state after the step. A patch is a
/// diff: every step starts a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    /// Program counter after the step.
    pub pc: usize,
    /// `(register index, value)` pairs, in write order.
    pub register_patch: Vec<(usize, i32)>,
    /// `(address, byte)` pairs, in write order.
    pub memory_patch: Vec<(u32, u8)>,
    /// Text printed by the step, if any.
    pub output: Option<String>,
    pub halted: bool,
    /// Set when the step suspended on an input syscall.
    pub input_request: Option<InputRequest>,
}

impl Patch {
    pub(crate) fn new(pc: usize) -> Self {
        Self {
            pc,
            ..Self::default()
        }
    }

    /// Whether the step changed neither registers nor memory.
    pub fn is_empty(&self) -> bool {
        self.register_patch.is_empty() && self.memory_patch.is_empty()
    }

    /// Replays the register and memory writes onto `registers` and `memory`.
    ///
    /// Hosts keeping their own copy of the state use this to follow the
    /// interpreter; the interpreter itself commits steps the same way.
    pub fn apply(
        &self,
        registers: &mut RegisterFile,
        memory: &mut Memory,
    ) -> Result<(), InterpreterError> {
        for &(index, value) in &self.register_patch {
            registers.set_index(index, value)?;
        }
        for &(address, byte) in &self.memory_patch {
            memory.write_byte(address, byte)?;
        }
        Ok(())
    }

    pub(crate) fn push_output(&mut self, text: &str) {
        self.output.get_or_insert_with(String::new).push_str(text);
    }
}
