use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mipsvm_interpreter::{
    init_logger, Interpreter, Program, RunHandle, RunOptions, RunOutcome,
    VmConfig, DEFAULT_MEMORY_SIZE, DEFAULT_STACK_SIZE,
};
use mipsvm_session::{Request, Response, Session, StatusUpdatePayload};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mipsvm")]
#[command(about = "Step-wise interpreter for structured MIPS-like programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Run a program to completion, reading program input from stdin
    Run {
        /// Path to the program in JSON form
        program: PathBuf,
        #[command(flatten)]
        options: VmArgs,
    },
    /// Step through a program, printing every update as a JSON line
    Trace {
        /// Path to the program in JSON form
        program: PathBuf,
        #[command(flatten)]
        options: VmArgs,
    },
    /// Serve protocol requests as JSON lines on stdin/stdout
    Jsonl {
        /// Bound every Run request to this many steps
        #[arg(long)]
        max_steps: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct VmArgs {
    /// Size of the data area in bytes
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Size of the space reserved after the data area in bytes
    #[arg(long, default_value_t = DEFAULT_STACK_SIZE)]
    stack_size: usize,

    /// Pause between steps in milliseconds
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<u64>,
}

impl VmArgs {
    const fn config(&self) -> VmConfig {
        VmConfig::new(self.memory_size, self.stack_size)
    }

    const fn run_options(&self) -> RunOptions {
        RunOptions {
            interval: Duration::from_millis(self.interval_ms),
            max_steps: self.max_steps,
        }
    }
}

fn load_program(path: &Path) -> Result<Program> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

/// Reads lines from `input` until one is accepted by the pending request.
fn provide_input(interpreter: &mut Interpreter, input: &mut impl BufRead) -> Result<()> {
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("stdin closed while the program was waiting for input");
        }
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        match interpreter.provide_input_text(line) {
            Ok(_) => return Ok(()),
            Err(err) if err.is_retryable() => warn!(%err, "input rejected, try again"),
            Err(err) => return Err(err.into()),
        }
    }
}

fn run(program: &Path, options: &VmArgs) -> Result<()> {
    let mut interpreter = Interpreter::new(load_program(program)?, options.config())?;
    let handle = RunHandle::new();
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout();

    loop {
        let mut write_result = Ok(());
        let outcome = interpreter.run(options.run_options(), &handle, |patch| {
            if let Some(text) = &patch.output {
                if write_result.is_ok() {
                    write_result = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush());
                }
            }
        })?;
        write_result?;

        match outcome {
            RunOutcome::Interrupted(_) => provide_input(&mut interpreter, &mut stdin)?,
            RunOutcome::Halted => break,
            RunOutcome::StepLimit => {
                warn!(steps = interpreter.stats().total_steps(), "step limit reached");
                break;
            }
            RunOutcome::Cancelled => break,
        }
    }

    interpreter.stats().log_summary();
    Ok(())
}

fn trace(program: &Path, options: &VmArgs) -> Result<()> {
    let mut interpreter = Interpreter::new(load_program(program)?, options.config())?;
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout().lock();

    let mut emit = |interpreter: &Interpreter| -> Result<()> {
        let update = StatusUpdatePayload::new(
            interpreter.registers(),
            interpreter.updates(),
            interpreter.pending_input(),
        );
        serde_json::to_writer(&mut stdout, &update)?;
        writeln!(stdout)?;
        Ok(())
    };
    emit(&interpreter)?;

    let run_options = options.run_options();
    let mut steps = 0u64;
    while !interpreter.is_halted() {
        if run_options.max_steps.is_some_and(|max| steps >= max) {
            warn!(steps, "step limit reached");
            break;
        }
        if interpreter.is_interrupted() {
            provide_input(&mut interpreter, &mut stdin)?;
        } else {
            interpreter.step()?;
            steps += 1;
        }
        emit(&interpreter)?;
        if !run_options.interval.is_zero() {
            std::thread::sleep(run_options.interval);
        }
    }

    interpreter.stats().log_summary();
    Ok(())
}

fn serve(max_steps: Option<u64>) -> Result<()> {
    let mut session = Session::new().with_step_limit(max_steps);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut write_result = Ok(());
        match serde_json::from_str::<Request>(&line) {
            Ok(request) => session.handle(request, |response| {
                if write_result.is_ok() {
                    write_result = serde_json::to_writer(&mut stdout, &response)
                        .map_err(anyhow::Error::from)
                        .and_then(|()| Ok(writeln!(stdout)?));
                }
            }),
            Err(err) => {
                let response = Response::Error(format!("malformed request: {err}"));
                serde_json::to_writer(&mut stdout, &response)?;
                writeln!(stdout)?;
            }
        }
        write_result?;
        stdout.flush()?;
    }

    info!("input closed, session ended");
    Ok(())
}

fn main() -> Result<()> {
    init_logger();

    match Cli::parse().command {
        CliCommand::Run { program, options } => run(&program, &options),
        CliCommand::Trace { program, options } => trace(&program, &options),
        CliCommand::Jsonl { max_steps } => serve(max_steps),
    }
}
