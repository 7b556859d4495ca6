mod context;
mod dispatch;
mod error;
mod interpreter;
mod loader;
mod patch;
mod runner;
mod syscall;

pub use error::InterpreterError;
pub use interpreter::Interpreter;
pub use patch::{ExecutionStatus, Input, InputRequest, Patch};
pub use runner::{RunHandle, RunOptions, RunOutcome};
pub use syscall::SyscallCode;
