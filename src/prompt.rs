use std::io::{BufRead, IsTerminal};

use inquire::InquireError;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("failed to read commit message from stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("commit message prompt failed: {0}")]
    Prompt(#[from] InquireError),
}

/// Ask for a commit message.
///
/// On a terminal this shows an interactive prompt; otherwise one line is read
/// from stdin. Cancelling the prompt with Esc yields an empty message.
///
/// # Errors
///
/// Returns `PromptError` if stdin cannot be read or the prompt fails.
pub fn read() -> Result<String, PromptError> {
    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        interactive()
    } else {
        debug!("stdin is not a terminal, reading commit message line");
        read_line(&mut std::io::stdin().lock())
    }
}

fn interactive() -> Result<String, PromptError> {
    let answer = inquire::Text::new("Commit message:")
        .with_help_message("leave empty to abort")
        .prompt();
    match answer {
        Ok(message) => Ok(message),
        Err(InquireError::OperationCanceled) => {
            debug!("Commit message prompt cancelled");
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read one line, without its line ending. EOF gives an empty string.
///
/// # Errors
///
/// Returns `PromptError::Io` if reading fails.
pub fn read_line(reader: &mut impl BufRead) -> Result<String, PromptError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    Ok(line)
}
