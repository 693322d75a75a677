use std::fmt::Write;

use crate::commands::command::{Command, Invocation};
use crate::message::CommitMessage;
use crate::settings::Settings;

/// The ordered steps of one deploy run: deploy, stage, commit, push
#[derive(Debug, Clone)]
pub struct Plan {
    commands: Vec<Command>,
}

impl Plan {
    /// Build the step list for `message`. Every step shares the configured
    /// working directory and extra environment.
    #[must_use]
    pub fn build(message: &CommitMessage, settings: &Settings) -> Self {
        let commands = [
            Command::new("Deploy", Invocation::Shell(settings.deploy.clone())),
            Command::new("Stage", Invocation::exec("git", ["add", "."])),
            Command::new(
                "Commit",
                Invocation::exec("git", ["commit", "-m", message.as_str()]),
            ),
            Command::new(
                "Push",
                Invocation::exec(
                    "git",
                    ["push", settings.remote.as_str(), settings.branch.as_str()],
                ),
            ),
        ]
        .into_iter()
        .map(|mut command| {
            command.cwd.clone_from(&settings.cwd);
            command.env.clone_from(&settings.env);
            command
        })
        .collect();
        Plan { commands }
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// One numbered line per step, names aligned
    #[must_use]
    pub fn render(&self) -> String {
        let width = self
            .commands
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        for (i, command) in self.commands.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {:<width$}  {}",
                i + 1,
                command.name,
                command.invocation
            );
        }
        out
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
