use mipsvm_interpreter::{InterpreterError, Memory, Patch, Register, RegisterFile, VmConfig};
use thiserror::Error;

use crate::protocol::StatusUpdatePayload;

#[derive(Debug, Error)]
pub enum ShadowError {
    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    #[error("odd-length {0} patch")]
    OddPatch(&'static str),

    #[error("{kind} patch entry out of range: {value}")]
    EntryOutOfRange { kind: &'static str, value: i64 },
}

/// Host copy of the machine state.
///
/// It never looks at the interpreter directly: registers, memory, pc and
/// output are rebuilt from patches (or from their wire form) alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowState {
    registers: RegisterFile,
    memory: Memory,
    pc: usize,
    output: String,
    halted: bool,
    waiting: bool,
}

impl ShadowState {
    pub fn new(config: VmConfig) -> Self {
        Self {
            registers: RegisterFile::default(),
            memory: Memory::new(config.total_size()),
            pc: 0,
            output: String::new(),
            halted: false,
            waiting: false,
        }
    }

    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn register(&self, register: Register) -> i32 {
        self.registers.get(register)
    }

    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    pub const fn pc(&self) -> usize {
        self.pc
    }

    /// Everything printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    pub const fn is_waiting_for_input(&self) -> bool {
        self.waiting
    }

    /// Forgets everything, e.g. before applying the patch of a reset.
    pub fn clear(&mut self) {
        self.registers.clear();
        self.memory.clear();
        self.pc = 0;
        self.output.clear();
        self.halted = false;
        self.waiting = false;
    }

    pub fn apply(&mut self, patch: &Patch) -> Result<(), ShadowError> {
        patch.apply(&mut self.registers, &mut self.memory)?;
        self.pc = patch.pc;
        self.push_output(patch.output.as_deref());
        self.halted |= patch.halted;
        self.waiting = patch.input_request.is_some();
        Ok(())
    }

    /// Applies an update received over the wire.
    ///
    /// The flat pair arrays are validated before anything is written, so a
    /// malformed update leaves the shadow untouched.
    pub fn apply_update(&mut self, update: &StatusUpdatePayload) -> Result<(), ShadowError> {
        let registers = pairs(&update.register_patch, "register")?;
        let memory = pairs(&update.memory_patch, "memory")?;

        let mut patch = Patch {
            pc: update.pc,
            output: update.output.clone(),
            halted: update.halted,
            ..Patch::default()
        };
        for (index, value) in registers {
            patch.register_patch.push((
                convert(index, "register")?,
                convert(value, "register value")?,
            ));
        }
        for (address, byte) in memory {
            patch
                .memory_patch
                .push((convert(address, "memory")?, convert(byte, "memory byte")?));
        }

        let mut next = self.clone();
        next.apply(&patch)?;
        next.waiting = update.io_interruption.is_some();
        *self = next;
        Ok(())
    }

    fn push_output(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            self.output.push_str(text);
        }
    }
}

fn pairs<'a>(
    flat: &'a [i64],
    kind: &'static str,
) -> Result<impl Iterator<Item = (i64, i64)> + 'a, ShadowError> {
    if flat.len() % 2 != 0 {
        return Err(ShadowError::OddPatch(kind));
    }
    Ok(flat.chunks_exact(2).map(|pair| (pair[0], pair[1])))
}

fn convert<T: TryFrom<i64>>(value: i64, kind: &'static str) -> Result<T, ShadowError> {
    T::try_from(value).map_err(|_| ShadowError::EntryOutOfRange { kind, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ShadowState {
        ShadowState::new(VmConfig::new(8, 0))
    }

    fn update(register_patch: Vec<i64>, memory_patch: Vec<i64>) -> StatusUpdatePayload {
        StatusUpdatePayload {
            registers: vec![0; 32],
            pc: 1,
            register_patch,
            memory_patch,
            output: Some("x".to_string()),
            halted: false,
            io_interruption: None,
        }
    }

    #[test]
    fn test_apply_update() {
        let mut shadow = small();
        shadow
            .apply_update(&update(vec![2, -9, 2, 4], vec![0, 255, 7, 1]))
            .unwrap();
        assert_eq!(shadow.register(Register::V0), 4);
        assert_eq!(shadow.memory().as_bytes(), &[255, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(shadow.pc(), 1);
        assert_eq!(shadow.output(), "x");
    }

    #[test]
    fn test_malformed_update_changes_nothing() {
        let mut shadow = small();
        let before = shadow.clone();

        assert!(matches!(
            shadow.apply_update(&update(vec![2], vec![])),
            Err(ShadowError::OddPatch("register"))
        ));
        assert!(matches!(
            shadow.apply_update(&update(vec![], vec![0, 256])),
            Err(ShadowError::EntryOutOfRange { value: 256, .. })
        ));
        assert!(shadow.apply_update(&update(vec![1, 1], vec![8, 1])).is_err());
        assert_eq!(shadow, before);
    }
}
