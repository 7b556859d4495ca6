use std::time::Duration;

use mipsvm_interpreter::{
    Interpreter, InterpreterError, Patch, RunHandle, RunOptions, RunOutcome,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::protocol::{Command, InitPayload, Request, Response, StatusUpdatePayload};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no program loaded; send Init first")]
    NotInitialized,

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),
}

/// Drives one interpreter from protocol requests.
///
/// Each request produces zero or more responses, handed to the caller's
/// sink as they happen so that a `Run` streams one update per step.
#[derive(Debug, Default)]
pub struct Session {
    interpreter: Option<Interpreter>,
    /// Set while a `Run` is suspended on input; the run continues once the
    /// input arrives.
    suspended_run: Option<Duration>,
    max_steps: Option<u64>,
    handle: RunHandle,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every `Run` to `max_steps` steps.
    pub fn with_step_limit(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Handle that stops the in-progress or next `Run` from another thread.
    ///
    /// A handle is spent once it has stopped a run; later runs use a fresh
    /// one, so fetch the handle again after each cancellation.
    pub fn run_handle(&self) -> RunHandle {
        self.handle.clone()
    }

    pub fn interpreter(&self) -> Option<&Interpreter> {
        self.interpreter.as_ref()
    }

    /// Handles `request`, passing every response to `emit`.
    pub fn handle(&mut self, request: Request, mut emit: impl FnMut(Response)) {
        if let Err(err) = self.dispatch(request, &mut emit) {
            warn!(%err, "request failed");
            emit(Response::Error(err.to_string()));
        }
    }

    /// Convenience wrapper collecting the responses to `request`.
    pub fn respond(&mut self, request: Request) -> Vec<Response> {
        let mut responses = Vec::new();
        self.handle(request, |response| responses.push(response));
        responses
    }

    fn dispatch(
        &mut self,
        request: Request,
        emit: &mut impl FnMut(Response),
    ) -> Result<(), SessionError> {
        match request {
            Request::Command { command } => match command {
                Command::Init(init) => self.init(init, emit),
                Command::Step => {
                    let interpreter = self.loaded()?;
                    let patch = interpreter.step()?;
                    emit(update(interpreter, &patch));
                    Ok(())
                }
                Command::Run { interval_ms } => self.run(Duration::from_millis(interval_ms), emit),
                Command::Reset => {
                    self.suspended_run = None;
                    let interpreter = self.loaded()?;
                    let patch = interpreter.reset()?;
                    emit(update(interpreter, &patch));
                    Ok(())
                }
            },
            Request::Input(text) => {
                let interpreter = self.loaded()?;
                let patch = interpreter.provide_input_text(&text)?;
                emit(update(interpreter, &patch));

                match self.suspended_run.take() {
                    Some(interval) => self.run(interval, emit),
                    None => Ok(()),
                }
            }
        }
    }

    fn init(&mut self, init: InitPayload, emit: &mut impl FnMut(Response)) -> Result<(), SessionError> {
        let config = init.config();
        let interpreter = Interpreter::new(init.program, config)?;
        info!(
            memory_size = config.memory_size,
            stack_size = config.stack_size,
            "session initialized"
        );
        emit(update(&interpreter, interpreter.updates()));
        self.interpreter = Some(interpreter);
        self.suspended_run = None;
        self.handle = RunHandle::new();
        Ok(())
    }

    fn run(&mut self, interval: Duration, emit: &mut impl FnMut(Response)) -> Result<(), SessionError> {
        let options = RunOptions {
            interval,
            max_steps: self.max_steps,
        };
        let handle = self.handle.clone();
        let interpreter = self.interpreter.as_mut().ok_or(SessionError::NotInitialized)?;
        if interpreter.is_halted() {
            return Err(InterpreterError::Halted.into());
        }

        // Snapshots are rebuilt from the patches since the interpreter is
        // borrowed by the loop.
        let mut registers = interpreter.registers().clone();
        let mut snapshot_error = None;
        let mut steps = 0usize;
        let outcome = interpreter.run(options, &handle, |patch| {
            if snapshot_error.is_some() {
                return;
            }
            for &(index, value) in &patch.register_patch {
                if let Err(err) = registers.set_index(index, value) {
                    snapshot_error = Some(err);
                    return;
                }
            }
            steps += 1;
            emit(Response::StatusUpdate(StatusUpdatePayload::new(
                &registers,
                patch,
                patch.input_request,
            )));
        })?;
        if let Some(err) = snapshot_error {
            return Err(err.into());
        }

        debug!(?outcome, steps, "run finished");
        // A run that stopped before its first step still reports where the
        // program stands, including a pending input request.
        if steps == 0 {
            emit(update(interpreter, interpreter.updates()));
        }
        match outcome {
            RunOutcome::Interrupted(_) => self.suspended_run = Some(interval),
            RunOutcome::Cancelled => self.handle = RunHandle::new(),
            RunOutcome::Halted | RunOutcome::StepLimit => {}
        }
        Ok(())
    }

    fn loaded(&mut self) -> Result<&mut Interpreter, SessionError> {
        self.interpreter.as_mut().ok_or(SessionError::NotInitialized)
    }
}

fn update(interpreter: &Interpreter, patch: &Patch) -> Response {
    Response::StatusUpdate(StatusUpdatePayload::new(
        interpreter.registers(),
        patch,
        interpreter.pending_input(),
    ))
}
