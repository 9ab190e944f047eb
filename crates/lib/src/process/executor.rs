//! The seam through which orchestration issues commands.

use tracing::info;

use super::command::CommandSpec;
use super::runner::ProcessRunner;
use super::sink::LineSink;
use super::types::ProcessError;

/// Runs one command to completion, forwarding its output to `sink`.
///
/// Implementations must not return until the command has fully finished;
/// callers rely on a returned error meaning no later command was started.
#[allow(async_fn_in_trait)]
pub trait Executor {
  async fn execute(&mut self, command: &CommandSpec, sink: &mut dyn LineSink) -> Result<(), ProcessError>;

  /// Whether commands actually run. Dry runs skip side effects such as
  /// taking cache locks.
  fn is_dry_run(&self) -> bool {
    false
  }
}

impl Executor for ProcessRunner {
  async fn execute(&mut self, command: &CommandSpec, sink: &mut dyn LineSink) -> Result<(), ProcessError> {
    let mut lines = self.spawn(command)?;
    while let Some(line) = lines.next_line().await? {
      sink.line(&line);
    }
    Ok(())
  }
}

/// Prints each command instead of running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRun;

impl Executor for DryRun {
  async fn execute(&mut self, command: &CommandSpec, sink: &mut dyn LineSink) -> Result<(), ProcessError> {
    info!(command = %command, "dry run, not executing");
    match &command.cwd {
      Some(dir) => sink.line(&format!("[{}] {}", dir.display(), command)),
      None => sink.line(&command.to_string()),
    }
    Ok(())
  }

  fn is_dry_run(&self) -> bool {
    true
  }
}
