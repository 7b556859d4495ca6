use super::{ExecutionStatus, InputRequest, Interpreter, InterpreterError, Patch};
use crate::{
    decode::Source,
    memory::{MemoryError, WORD_SIZE},
    registers::Register,
};

/// Staging area for one step (or one input resumption).
///
/// Reads observe the committed state of the interpreter. Writes are only
/// recorded into the step's [`Patch`]; the interpreter applies the patch once
/// the whole step has succeeded, so a failing step never leaves partial
/// changes behind.
pub(crate) struct StepContext<'a> {
    interpreter: &'a Interpreter,
    patch: Patch,
    status: Option<ExecutionStatus>,
}

/// The result of a successful step, ready to be committed.
pub(crate) struct StepOutcome {
    pub(crate) patch: Patch,
    pub(crate) status: Option<ExecutionStatus>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(interpreter: &'a Interpreter, next_pc: usize) -> Self {
        Self {
            interpreter,
            patch: Patch::new(next_pc),
            status: None,
        }
    }

    /// The pc the interpreter will continue from.
    pub(crate) const fn next_pc(&self) -> usize {
        self.patch.pc
    }

    pub(crate) fn register(&self, register: Register) -> i32 {
        self.interpreter.registers.get(register)
    }

    pub(crate) fn value(&self, source: Source) -> i32 {
        match source {
            Source::Reg(register) => self.register(register),
            Source::Imm(imm) => imm,
        }
    }

    pub(crate) fn set_register(&mut self, register: Register, value: i32) {
        self.patch.register_patch.push((register.index(), value));
    }

    pub(crate) fn read_word(&self, address: i64) -> Result<i32, InterpreterError> {
        let start = self.interpreter.memory.check_range(address, WORD_SIZE)?;
        Ok(self.interpreter.memory.read_word(start as u32)?)
    }

    pub(crate) fn read_cstring(&self, address: i64) -> Result<String, InterpreterError> {
        let start = self.interpreter.memory.check_range(address, 1)?;
        Ok(self.interpreter.memory.read_cstring(start as u32)?)
    }

    /// Checks that `len` bytes at `address` may be written.
    pub(crate) fn check_writable(&self, address: i64, len: usize) -> Result<u32, MemoryError> {
        self.interpreter
            .memory
            .check_range(address, len)
            .map(|start| start as u32)
    }

    pub(crate) fn write_word(&mut self, address: i64, value: i32) -> Result<(), InterpreterError> {
        let start = self.check_writable(address, WORD_SIZE)?;
        for (offset, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.patch.memory_patch.push((start + offset as u32, byte));
        }
        Ok(())
    }

    /// Writes `bytes` starting at `address`, recording one entry per byte.
    pub(crate) fn write_bytes(&mut self, address: i64, bytes: &[u8]) -> Result<(), InterpreterError> {
        let start = self.check_writable(address, bytes.len())?;
        self.patch.memory_patch.extend(
            bytes
                .iter()
                .enumerate()
                .map(|(offset, byte)| (start + offset as u32, *byte)),
        );
        Ok(())
    }

    pub(crate) fn emit_output(&mut self, text: &str) {
        self.patch.push_output(text);
    }

    pub(crate) fn jump_to(&mut self, pc: usize) {
        self.patch.pc = pc;
    }

    /// Position of the label named `name` in the statement list.
    pub(crate) fn label_position(&self, name: &str) -> Result<usize, InterpreterError> {
        self.interpreter
            .labels
            .get(name)
            .copied()
            .ok_or_else(|| InterpreterError::UnknownLabel(name.to_string()))
    }

    /// Address of the data-segment variable named `name`.
    pub(crate) fn variable_address(&self, name: &str) -> Result<i32, InterpreterError> {
        self.interpreter
            .variables
            .get(name)
            .map(|&address| address as i32)
            .ok_or_else(|| InterpreterError::UnknownLabel(name.to_string()))
    }

    pub(crate) fn statement_count(&self) -> usize {
        self.interpreter.statements.len()
    }

    pub(crate) fn halt(&mut self) {
        self.patch.halted = true;
        self.status = Some(ExecutionStatus::Halted);
    }

    pub(crate) fn interrupt(&mut self, request: InputRequest) {
        self.patch.input_request = Some(request);
        self.status = Some(ExecutionStatus::Interrupted(request));
    }

    pub(crate) fn resume(&mut self) {
        self.status = Some(ExecutionStatus::Running);
    }

    pub(crate) fn finish(self) -> StepOutcome {
        StepOutcome {
            patch: self.patch,
            status: self.status,
        }
    }
}
