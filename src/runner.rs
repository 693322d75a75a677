//! Sequential, fail-fast execution of deploy steps

use std::fmt;
use std::io;
use std::process::{Child, Command as ProcessCommand, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::commands::command::Command;
use crate::style::{Style, format_duration};

/// Interval between exit checks while a time-limited step runs
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a launched step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// Exited with a non-zero status
    Code(i32),
    /// Terminated without an exit code, e.g. by a signal
    Terminated,
    /// Killed after exceeding the step time limit
    TimedOut,
}

impl Exit {
    #[must_use]
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            _ if status.success() => Exit::Success,
            Some(code) => Exit::Code(code),
            None => Exit::Terminated,
        }
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exit::Success => f.write_str("success"),
            Exit::Code(code) => write!(f, "exit code {code}"),
            Exit::Terminated => f.write_str("terminated by signal"),
            Exit::TimedOut => f.write_str("timed out"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("step '{step}' failed ({exit}): {command}")]
    Failed {
        step: String,
        command: String,
        exit: Exit,
    },
    #[error("step '{step}' could not be started: {command}: {source}")]
    Launch {
        step: String,
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("step '{step}' timed out after {timeout:?}: {command}")]
    TimedOut {
        step: String,
        command: String,
        timeout: Duration,
    },
}

impl RunError {
    /// Name of the step that failed
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            RunError::Failed { step, .. }
            | RunError::Launch { step, .. }
            | RunError::TimedOut { step, .. } => step,
        }
    }
}

/// Launches a single step and blocks until it has finished
pub trait Executor {
    /// Run `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the process could not be started or waited on.
    fn execute(&mut self, command: &Command, timeout: Option<Duration>) -> io::Result<Exit>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, command: &Command, timeout: Option<Duration>) -> io::Result<Exit> {
        (**self).execute(command, timeout)
    }
}

/// Spawns real processes that inherit stdin, stdout and stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&mut self, command: &Command, timeout: Option<Duration>) -> io::Result<Exit> {
        let mut process = ProcessCommand::from(command);
        let Some(limit) = timeout else {
            return process.status().map(Exit::from_status);
        };

        // A time-limited step gets its own process group so everything it
        // started can be killed together.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut process, 0);

        let mut child = process.spawn()?;
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Exit::from_status(status));
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Killing '{}' after {:?}", command.name, limit);
                if let Err(e) = kill_tree(&mut child) {
                    debug!("Kill of '{}' failed: {e}", command.name);
                }
                child.wait()?;
                return Ok(Exit::TimedOut);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Kill `child` and every process in its process group
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    let pgid = i32::try_from(child.id())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill has no memory-safety preconditions; a negative pid
    // addresses the process group the child leads.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    child.kill()
}

/// Summary of a run in which every step passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub passed: usize,
    pub elapsed: Duration,
}

/// Runs steps one after another and stops at the first failure
pub struct Runner<E> {
    executor: E,
    timeout: Option<Duration>,
}

impl<E: Executor> Runner<E> {
    pub fn new(executor: E) -> Self {
        Runner {
            executor,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `commands` in order. Progress goes to stderr; step output is
    /// not captured.
    ///
    /// # Errors
    ///
    /// Returns the `RunError` of the first step that fails. Steps after it are
    /// never launched.
    pub fn run(&mut self, commands: &[Command]) -> Result<RunReport, RunError> {
        let sty = Style::stderr();
        let total = commands.len();
        let counter_width = total.to_string().len();
        let total_start = Instant::now();
        let mut passed = 0usize;

        for (i, cmd) in commands.iter().enumerate() {
            let idx = i + 1;
            let prefix = format!("[{idx:>counter_width$}/{total}]");
            let command_line = cmd.invocation.to_string();

            eprintln!("{} {} {}", sty.bold(&prefix), cmd.name, sty.dim(&command_line));
            info!("Running step '{}': {command_line}", cmd.name);

            let start = Instant::now();
            let result = self.executor.execute(cmd, self.timeout);
            let elapsed = start.elapsed();

            let error = match result {
                Ok(Exit::Success) => {
                    eprintln!(
                        "{} {} {}",
                        sty.dim(&prefix),
                        sty.green("PASS"),
                        sty.dim(&format_duration(elapsed))
                    );
                    passed += 1;
                    continue;
                }
                Ok(Exit::TimedOut) => RunError::TimedOut {
                    step: cmd.name.clone(),
                    command: command_line,
                    timeout: self.timeout.unwrap_or(elapsed),
                },
                Ok(exit) => RunError::Failed {
                    step: cmd.name.clone(),
                    command: command_line,
                    exit,
                },
                Err(source) => RunError::Launch {
                    step: cmd.name.clone(),
                    command: command_line,
                    source,
                },
            };

            let detail = match &error {
                RunError::Failed { exit, .. } => exit.to_string(),
                RunError::Launch { .. } => "could not start".to_string(),
                RunError::TimedOut { .. } => "timed out".to_string(),
            };
            eprintln!(
                "{} {} {}",
                sty.dim(&prefix),
                sty.red(&format!("FAIL ({detail})")),
                sty.dim(&format_duration(elapsed))
            );
            debug!("Step '{}' failed, skipping {} remaining", cmd.name, total - idx);
            eprintln!();
            print_summary(&sty, passed, 1, total - idx, total, total_start.elapsed());
            return Err(error);
        }

        let elapsed = total_start.elapsed();
        eprintln!();
        print_summary(&sty, passed, 0, 0, total, elapsed);
        Ok(RunReport { passed, elapsed })
    }
}

fn print_summary(
    sty: &Style,
    passed: usize,
    failed: usize,
    skipped: usize,
    total: usize,
    elapsed: Duration,
) {
    let mut parts = Vec::new();
    if passed > 0 {
        parts.push(sty.green(&format!("{passed} passed")));
    }
    if failed > 0 {
        parts.push(sty.red(&format!("{failed} failed")));
    }
    if skipped > 0 {
        parts.push(sty.yellow(&format!("{skipped} not run")));
    }

    eprintln!(
        "{} {} {}",
        sty.bold(&format!("{total} steps:")),
        parts.join(&sty.dim(", ")),
        sty.dim(&format!("({})", format_duration(elapsed)))
    );
}
