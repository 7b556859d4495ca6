use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use tracing::{debug, info};

use super::{ExecutionStatus, InputRequest, Interpreter, InterpreterError, Patch};

/// Cancellation token for a [`Interpreter::run`] loop.
///
/// Clones share the same flag, so a host can keep one and hand the other to
/// the thread driving the loop.
#[derive(Debug, Clone, Default)]
pub struct RunHandle {
    cancelled: Arc<AtomicBool>,
}

impl RunHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the loop stop before its next step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Pause after each step. Zero runs flat out.
    pub interval: Duration,
    /// Stop after this many steps.
    pub max_steps: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            max_steps: None,
        }
    }
}

impl RunOptions {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    /// The program is waiting for input; provide it and run again.
    Interrupted(InputRequest),
    Cancelled,
    StepLimit,
}

impl Interpreter {
    /// Steps until the program halts, suspends on input, is cancelled
    /// through `handle`, or reaches `options.max_steps`.
    ///
    /// Every successful step's patch is handed to `sink` before the next step
    /// starts. A step error ends the loop and is returned.
    pub fn run(
        &mut self,
        options: RunOptions,
        handle: &RunHandle,
        mut sink: impl FnMut(&Patch),
    ) -> Result<RunOutcome, InterpreterError> {
        let mut steps = 0u64;
        let outcome = loop {
            match self.status() {
                ExecutionStatus::Halted => break RunOutcome::Halted,
                ExecutionStatus::Interrupted(request) => break RunOutcome::Interrupted(request),
                ExecutionStatus::Loaded | ExecutionStatus::Running => {}
            }
            if handle.is_cancelled() {
                break RunOutcome::Cancelled;
            }
            if options.max_steps.is_some_and(|max| steps >= max) {
                break RunOutcome::StepLimit;
            }

            let patch = self.step()?;
            steps += 1;
            sink(&patch);

            if !options.interval.is_zero() {
                thread::sleep(options.interval);
            }
        };

        debug!(steps, ?outcome, "run loop stopped");
        if outcome == RunOutcome::Halted {
            info!(steps = self.stats().total_steps(), "program halted");
        }
        Ok(outcome)
    }
}
