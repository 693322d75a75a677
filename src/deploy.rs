//! The deploy driver: commit message in, four steps out

use log::debug;

use crate::commands::plan::Plan;
use crate::message::{CommitMessage, MessageError};
use crate::prompt::PromptError;
use crate::runner::{Executor, RunError, RunReport, Runner};
use crate::settings::Settings;
use crate::style::Style;

/// Inputs collected from the command line
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    /// Commit message; prompted for when absent
    pub message: Option<String>,
    /// Print the plan instead of running it
    pub dry_run: bool,
}

/// Terminal state of a deploy run
#[derive(Debug)]
pub enum Outcome {
    /// Every step passed
    Done(RunReport),
    /// The commit message was empty, nothing ran
    AbortedEmptyInput,
    /// Dry run: the plan was printed, nothing ran
    Planned(Plan),
    /// A step failed and the steps after it never ran
    Failed(RunError),
}

impl Outcome {
    /// Process exit status for this outcome
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Done(_) | Outcome::AbortedEmptyInput | Outcome::Planned(_) => 0,
            Outcome::Failed(_) => 1,
        }
    }
}

/// Collect the commit message, build the plan and run it.
///
/// `prompt` is only called when `args.message` is `None`.
///
/// # Errors
///
/// Returns `PromptError` if the commit message could not be read. Step
/// failures are not errors here; they come back as `Outcome::Failed`.
pub fn run<P, E>(
    args: DeployArgs,
    settings: &Settings,
    prompt: P,
    executor: E,
) -> Result<Outcome, PromptError>
where
    P: FnOnce() -> Result<String, PromptError>,
    E: Executor,
{
    let text = match args.message {
        Some(text) => text,
        None => prompt()?,
    };

    let message = match CommitMessage::new(text) {
        Ok(message) => message,
        Err(MessageError::Empty) => {
            debug!("Empty commit message, nothing to do");
            let sty = Style::stderr();
            eprintln!(
                "{}",
                sty.yellow("No commit message given, aborting. Nothing was run.")
            );
            return Ok(Outcome::AbortedEmptyInput);
        }
    };

    let plan = Plan::build(&message, settings);
    if args.dry_run {
        print!("{}", plan.render());
        return Ok(Outcome::Planned(plan));
    }

    let mut runner = Runner::new(executor).with_timeout(settings.timeout);
    match runner.run(plan.commands()) {
        Ok(report) => {
            let sty = Style::stdout();
            println!("{}", sty.green("All steps completed."));
            Ok(Outcome::Done(report))
        }
        Err(e) => {
            debug!("Deploy run failed at step '{}'", e.step());
            let sty = Style::stderr();
            eprintln!("{} {e}", sty.red("Error:"));
            Ok(Outcome::Failed(e))
        }
    }
}
