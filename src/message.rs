use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    #[error("commit message is empty")]
    Empty,
}

/// A commit message that is known to contain more than whitespace.
///
/// The text is kept exactly as the user typed it; only the emptiness check
/// looks at the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    /// # Errors
    ///
    /// Returns `MessageError::Empty` if `text` is empty or whitespace-only.
    pub fn new(text: impl Into<String>) -> Result<Self, MessageError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MessageError::Empty);
        }
        Ok(CommitMessage(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitMessage {
    type Error = MessageError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        CommitMessage::new(text)
    }
}

impl AsRef<str> for CommitMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
