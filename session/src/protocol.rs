//! Message vocabulary of the remote variant.
//!
//! Every message is framed as `{"type": ..., "payload": ...}`. Register and
//! memory patches travel as flat `[index, value, index, value, ...]` arrays.

use mipsvm_interpreter::{
    InputRequest, Patch, Program, RegisterFile, VmConfig, DEFAULT_MEMORY_SIZE, DEFAULT_STACK_SIZE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Request {
    Command { command: Command },
    /// Host text answering a pending `read-int` or `read-string`.
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    Init(InitPayload),
    Step,
    Run {
        #[serde(default)]
        interval_ms: u64,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPayload {
    pub program: Program,
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
}

const fn default_memory_size() -> usize {
    DEFAULT_MEMORY_SIZE
}

const fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

impl InitPayload {
    pub fn new(program: Program, config: VmConfig) -> Self {
        Self {
            program,
            memory_size: config.memory_size,
            stack_size: config.stack_size,
        }
    }

    pub const fn config(&self) -> VmConfig {
        VmConfig::new(self.memory_size, self.stack_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    StatusUpdate(StatusUpdatePayload),
    Error(String),
}

/// The state change of one step, together with a register snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdatePayload {
    /// All 32 registers after the step.
    pub registers: Vec<i32>,
    pub pc: usize,
    /// Flat `(register index, value)` pairs.
    pub register_patch: Vec<i64>,
    /// Flat `(address, byte)` pairs.
    pub memory_patch: Vec<i64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub halted: bool,
    #[serde(default)]
    pub io_interruption: Option<IoInterruption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum IoInterruption {
    Input(InputKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Number,
    String,
}

impl From<InputRequest> for IoInterruption {
    fn from(request: InputRequest) -> Self {
        match request {
            InputRequest::Integer => Self::Input(InputKind::Number),
            InputRequest::Text { .. } => Self::Input(InputKind::String),
        }
    }
}

impl StatusUpdatePayload {
    /// Builds the update for `patch`. `registers` is the register file after
    /// the patch and `pending` the input the program now waits for.
    pub fn new(registers: &RegisterFile, patch: &Patch, pending: Option<InputRequest>) -> Self {
        Self {
            registers: registers.as_array().to_vec(),
            pc: patch.pc,
            register_patch: patch
                .register_patch
                .iter()
                .flat_map(|&(index, value)| [index as i64, value.into()])
                .collect(),
            memory_patch: patch
                .memory_patch
                .iter()
                .flat_map(|&(address, byte)| [address.into(), byte.into()])
                .collect(),
            output: patch.output.clone(),
            halted: patch.halted,
            io_interruption: pending.map(IoInterruption::from),
        }
    }
}
