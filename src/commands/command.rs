use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command as ProcessCommand;

use log::debug;

/// How a step is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A command line handed to `sh -c`
    Shell(String),
    /// A program and its arguments, launched without a shell
    Exec { program: String, args: Vec<String> },
}

impl Invocation {
    pub fn exec<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Quote an argument for display. Never used to build a real command line.
fn quote_arg(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        return Cow::Borrowed(arg);
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Shell(line) => f.write_str(line),
            Invocation::Exec { program, args } => {
                f.write_str(&quote_arg(program))?;
                for arg in args {
                    write!(f, " {}", quote_arg(arg))?;
                }
                Ok(())
            }
        }
    }
}

/// A single step of a deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub invocation: Invocation,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl Command {
    pub fn new(name: impl Into<String>, invocation: Invocation) -> Self {
        Command {
            name: name.into(),
            invocation,
            cwd: None,
            env: HashMap::new(),
        }
    }
}

impl From<&Command> for ProcessCommand {
    fn from(command: &Command) -> Self {
        debug!("Building command '{}'", command.invocation);
        let mut process = match &command.invocation {
            Invocation::Shell(line) => {
                let mut process = ProcessCommand::new("sh");
                process.args(["-c", line]);
                process
            }
            Invocation::Exec { program, args } => {
                let mut process = ProcessCommand::new(program);
                process.args(args);
                process
            }
        };
        if let Some(cwd) = &command.cwd {
            process.current_dir(cwd);
        }
        process.envs(&command.env);
        process
    }
}
