mod deploy;

use std::process::ExitCode;

use clap::Parser;
use log::debug;

use shipit::load_config;

#[derive(Parser, Debug)]
#[command(
    name = "shipit",
    version,
    about = "Deploy the backend, commit local changes and push them"
)]
struct Cli {
    /// Path to config file (auto-detected if not specified)
    #[arg(short, long)]
    config: Option<String>,

    /// Log file path (log records are written here as well as to stderr)
    #[arg(long)]
    log_file: Option<String>,

    #[command(flatten)]
    deploy: deploy::DeployCliArgs,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .as_ref()
        .map(std::fs::File::create)
        .transpose()?;
    shipit::logger::init(log_file)?;

    let (settings, config_path) = load_config(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        debug!("Using config file {}", path.display());
    }

    deploy::run(cli.deploy, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_starting_with_hyphen() {
        let cli = Cli::try_parse_from(["shipit", "-1 fix flaky test"]).unwrap();
        assert_eq!(cli.deploy.message.as_deref(), Some("-1 fix flaky test"));
        assert!(!cli.deploy.dry_run);
    }

    #[test]
    fn test_hyphen_message_after_flags() {
        let cli = Cli::try_parse_from(["shipit", "--dry-run", "-1 fix flaky test"]).unwrap();
        assert_eq!(cli.deploy.message.as_deref(), Some("-1 fix flaky test"));
        assert!(cli.deploy.dry_run);
    }

    #[test]
    fn test_message_is_optional() {
        let cli = Cli::try_parse_from(["shipit", "-c", "deploy.yaml"]).unwrap();
        assert_eq!(cli.deploy.message, None);
        assert_eq!(cli.config.as_deref(), Some("deploy.yaml"));
    }
}
