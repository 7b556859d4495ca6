use ahash::AHashMap;
use tracing::{debug, instrument, trace};

use super::{
    context::{StepContext, StepOutcome},
    ExecutionStatus, Input, InputRequest, InterpreterError, Patch,
};
use crate::{
    config::VmConfig,
    decode::decode,
    memory::Memory,
    program::{Program, Statement},
    registers::{Register, RegisterFile},
    stats::ExecutionStats,
};

/// A single interpreter instance.
///
/// It exclusively owns the register file, memory and the loaded statements.
/// Hosts observe it through the [`Patch`] returned by every state-changing
/// call and keep their own copies of the state.
#[derive(Debug, Clone)]
pub struct Interpreter {
    config: VmConfig,
    /// The program as originally supplied, reloaded on reset.
    pub(crate) program: Program,
    pub(crate) registers: RegisterFile,
    pub(crate) memory: Memory,
    pub(crate) statements: Vec<Statement>,
    /// Data-segment variable name to byte address.
    pub(crate) variables: AHashMap<String, u32>,
    /// Label name to statement index.
    pub(crate) labels: AHashMap<String, usize>,
    pc: usize,
    status: ExecutionStatus,
    updates: Patch,
    stats: ExecutionStats,
}

impl Interpreter {
    /// Creates an interpreter and loads `program` into it.
    pub fn new(program: Program, config: VmConfig) -> Result<Self, InterpreterError> {
        let mut interpreter = Self {
            config,
            program,
            registers: RegisterFile::default(),
            memory: Memory::new(config.total_size()),
            statements: Vec::new(),
            variables: AHashMap::new(),
            labels: AHashMap::new(),
            pc: 0,
            status: ExecutionStatus::Loaded,
            updates: Patch::default(),
            stats: ExecutionStats::default(),
        };
        interpreter.load()?;
        Ok(interpreter)
    }

    pub const fn config(&self) -> &VmConfig {
        &self.config
    }

    pub const fn program(&self) -> &Program {
        &self.program
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

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub const fn pc(&self) -> usize {
        self.pc
    }

    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub const fn is_halted(&self) -> bool {
        matches!(self.status, ExecutionStatus::Halted)
    }

    pub const fn is_interrupted(&self) -> bool {
        matches!(self.status, ExecutionStatus::Interrupted(_))
    }

    /// The input the program is currently waiting for.
    pub const fn pending_input(&self) -> Option<InputRequest> {
        match self.status {
            ExecutionStatus::Interrupted(request) => Some(request),
            _ => None,
        }
    }

    /// The patch produced by the most recent load, step or input.
    pub const fn updates(&self) -> &Patch {
        &self.updates
    }

    pub const fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Applies a successful step: replays the patch onto the state and
    /// makes it the current update record. `None` keeps the current status.
    pub(crate) fn commit(
        &mut self,
        patch: Patch,
        status: Option<ExecutionStatus>,
    ) -> Result<(), InterpreterError> {
        patch.apply(&mut self.registers, &mut self.memory)?;
        self.pc = patch.pc;
        if let Some(status) = status {
            self.status = status;
        }
        self.updates = patch;
        Ok(())
    }

    fn apply(&mut self, outcome: StepOutcome) -> Result<(), InterpreterError> {
        self.commit(outcome.patch, outcome.status)
    }

    /// Executes exactly one statement.
    ///
    /// Fails with `Halted` once the program has halted. While an input
    /// syscall is pending the step is declined and an empty patch returned.
    /// On error nothing is changed.
    #[instrument(level = "trace", skip(self), fields(pc = self.pc))]
    pub fn step(&mut self) -> Result<Patch, InterpreterError> {
        match self.status {
            ExecutionStatus::Halted => return Err(InterpreterError::Halted),
            ExecutionStatus::Interrupted(request) => {
                debug!(%request, "step declined while waiting for input");
                self.updates = Patch::new(self.pc);
                return Ok(self.updates.clone());
            }
            ExecutionStatus::Loaded | ExecutionStatus::Running => {}
        }

        let len = self.statements.len();
        if self.pc >= len {
            return Err(InterpreterError::ProgramCounterOutOfRange {
                pc: self.pc as i64,
                len,
            });
        }

        let mut ctx = StepContext::new(self, self.pc + 1);
        let executed = match &self.statements[self.pc] {
            Statement::Label(name) => {
                trace!(label = %name, "label");
                None
            }
            Statement::Instruction(instruction) => {
                let (opcode, operation) = decode(instruction)?;
                trace!(?operation, "execute {opcode}");
                ctx.execute(operation)?;
                Some(opcode)
            }
        };
        let outcome = ctx.finish();

        self.stats.record(executed);
        let status = outcome
            .status
            .or((self.status == ExecutionStatus::Loaded).then_some(ExecutionStatus::Running));
        self.commit(outcome.patch, status)?;
        Ok(self.updates.clone())
    }

    /// Resumes an interrupted program with externally supplied input.
    ///
    /// Returns the patch of the writes performed. Fails with `NotInterrupted`
    /// when no input is pending and with `InvalidInput` when the input kind
    /// does not match the request; the interpreter then stays interrupted.
    pub fn provide_input(&mut self, input: Input) -> Result<Patch, InterpreterError> {
        let request = self.pending_input().ok_or(InterpreterError::NotInterrupted)?;

        let mut ctx = StepContext::new(self, self.pc);
        ctx.complete_input(request, input)?;
        let outcome = ctx.finish();

        debug!(%request, "input provided, resuming");
        self.apply(outcome)?;
        Ok(self.updates.clone())
    }

    /// Parses host text according to the pending request and resumes.
    ///
    /// A malformed integer fails with `InvalidInput`, which the host may
    /// retry.
    pub fn provide_input_text(&mut self, text: &str) -> Result<Patch, InterpreterError> {
        let request = self.pending_input().ok_or(InterpreterError::NotInterrupted)?;
        let input = match request {
            InputRequest::Integer => text
                .trim()
                .parse::<i32>()
                .map(Input::Integer)
                .map_err(|err| InterpreterError::InvalidInput(format!("{text:?}: {err}")))?,
            InputRequest::Text { .. } => Input::Text(text.to_string()),
        };
        self.provide_input(input)
    }

    /// Clears all state and reloads the original program.
    ///
    /// Permitted from any state. Returns the load patch.
    pub fn reset(&mut self) -> Result<Patch, InterpreterError> {
        self.registers.clear();
        self.memory.clear();
        self.statements.clear();
        self.variables.clear();
        self.labels.clear();
        self.pc = 0;
        self.status = ExecutionStatus::Loaded;
        self.updates = Patch::default();
        self.stats = ExecutionStats::default();

        self.load()?;
        debug!(pc = self.pc, "interpreter reset");
        Ok(self.updates.clone())
    }
}
