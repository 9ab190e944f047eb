//! Error type for external process execution.

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started (missing binary, bad working directory).
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The command ran and exited unsuccessfully.
  ///
  /// `code` is `None` when the child was terminated by a signal.
  #[error("command failed with exit code {code:?}: {command}")]
  Failed { command: String, code: Option<i32> },

  /// I/O error while reading output or waiting for the child.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ProcessError {
  /// The child's exit code, if this error came from a command that exited.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ProcessError::Failed { code, .. } => *code,
      _ => None,
    }
  }
}
