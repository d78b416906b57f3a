use anyhow::{Context, Result};
use clap::Parser;
use procfreeze::{ControlError, SuspensionState};
use std::process::ExitCode;
use tracing::debug;

/// Freeze or unfreeze a running process
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Process id of the target
    #[arg(allow_negative_numbers = true)]
    pid: i64,

    /// Resume the process instead of freezing it
    #[arg(short, long, conflicts_with = "toggle")]
    resume: bool,

    /// Freeze a running process, resume a frozen one
    #[arg(short, long)]
    toggle: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Freeze,
    Resume,
}

impl Action {
    fn progressive(self) -> &'static str {
        match self {
            Action::Freeze => "Freezing",
            Action::Resume => "Resuming",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Action::Freeze => "freeze",
            Action::Resume => "resume",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Action::Freeze => "froze",
            Action::Resume => "resumed",
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = initialize_logging(args.debug) {
        eprintln!("Warning: {e}");
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn choose_action(args: &Args) -> Result<Action> {
    if args.resume {
        return Ok(Action::Resume);
    }
    if !args.toggle {
        return Ok(Action::Freeze);
    }

    let state = procfreeze::suspension_state(args.pid)
        .with_context(|| format!("Failed to query state of process {}", args.pid))?;
    debug!(pid = args.pid, state = ?state, "Toggling process");

    Ok(match state {
        SuspensionState::Suspended => Action::Resume,
        // Unknown usually means partially frozen: finish the job
        SuspensionState::Running | SuspensionState::Unknown => Action::Freeze,
    })
}

fn undo_hint() -> &'static str {
    if cfg!(windows) {
        "To unfreeze, run this program again with --resume or use NtResumeProcess"
    } else {
        "To unfreeze, run this program again with --resume or send SIGCONT"
    }
}

fn run(args: &Args) -> Result<bool> {
    let pid = args.pid;

    match procfreeze::try_process_exists(pid) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Error: Process {pid} does not exist");
            return Ok(false);
        }
        Err(ControlError::InvalidArgument { .. }) => {
            eprintln!("Error: Invalid PID");
            return Ok(false);
        }
        Err(e) => return Err(e).context("Failed to check process"),
    }

    let action = choose_action(args)?;
    println!("{} process {pid}...", action.progressive());

    match procfreeze::set_suspended(pid, action == Action::Freeze) {
        Ok(true) => {
            println!("Successfully {} process {pid}", action.past());
            if action == Action::Freeze {
                println!("{}", undo_hint());
            }
            Ok(true)
        }
        Ok(false) => {
            eprintln!("Failed to {} process {pid}: process exited", action.verb());
            Ok(false)
        }
        Err(e) => {
            eprintln!("Failed to {} process {pid}: {e}", action.verb());
            Ok(false)
        }
    }
}
