//! Result type for a single command execution.

use std::time::Duration;

use serde::Serialize;

use crate::channel::Completion;

/// Outcome of executing one command on the interactive shell.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// The command that was executed.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub output: String,

    /// The prompt seen at the end of the output, if any.
    pub prompt: Option<String>,

    /// Privilege level the prompt belongs to.
    pub privilege: Option<String>,

    /// Time spent waiting for output.
    pub elapsed: Duration,

    /// How the read loop decided the output was finished.
    pub completion: Completion,

    /// Failure marker found in the output (e.g. `% Invalid input`).
    pub failure_message: Option<String>,
}

impl CommandResult {
    /// True only when the prompt came back. After an idle stop or an
    /// elapsed wait the output may be truncated.
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Prompt
    }

    /// True when no failure marker was found.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}
