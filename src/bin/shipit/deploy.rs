use std::process::ExitCode;

use clap::Args;

use shipit::deploy::DeployArgs;
use shipit::runner::SystemExecutor;
use shipit::settings::Settings;

#[derive(Args, Debug)]
pub struct DeployCliArgs {
    /// Commit message (prompted for if omitted)
    #[arg(allow_hyphen_values = true)]
    pub(crate) message: Option<String>,

    /// Print the steps that would run without running them
    #[arg(long)]
    pub(crate) dry_run: bool,
}

/// Run the deploy steps.
///
/// # Errors
///
/// Returns an error if the commit message cannot be read.
pub fn run(args: DeployCliArgs, settings: &Settings) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = DeployArgs {
        message: args.message,
        dry_run: args.dry_run,
    };
    let outcome = shipit::deploy::run(args, settings, shipit::prompt::read, SystemExecutor)?;
    Ok(ExitCode::from(outcome.exit_code()))
}
