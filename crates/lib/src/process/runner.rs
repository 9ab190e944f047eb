//! Spawning external commands and streaming their output line by line.
//!
//! A spawned child gets two reader tasks: one forwarding stdout lines into a
//! bounded channel, one either forwarding stderr lines into the same channel
//! (merge) or buffering stderr in memory (capture). Both pipes are drained
//! concurrently, so a chatty stream can never fill its pipe and stall the
//! child while the other is being read. The exit status is only inspected
//! after both readers have hit end-of-file.

use std::io;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::command::{CommandSpec, StderrMode};
use super::types::ProcessError;

/// Lines buffered between the reader tasks and the consumer.
const LINE_BUFFER: usize = 64;

/// Launches external commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }

  /// Start `command` and return a stream over its output.
  ///
  /// Must be called from within a tokio runtime.
  pub fn spawn(&self, command: &CommandSpec) -> Result<OutputLines, ProcessError> {
    info!(command = %command, cwd = ?command.cwd, "running command");

    let mut cmd = Command::new(&command.program);
    cmd
      .args(&command.args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    if let Some(dir) = &command.cwd {
      cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
      program: command.program.clone(),
      source,
    })?;

    debug!(pid = ?child.id(), program = %command.program, "spawned process");

    let stdout = child
      .stdout
      .take()
      .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let stderr = child
      .stderr
      .take()
      .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    let stdout_task = tokio::spawn(forward_lines(stdout, tx.clone()));
    let stderr_task = match command.stderr {
      StderrMode::Merge => tokio::spawn(async move { forward_lines(stderr, tx).await.map(|()| String::new()) }),
      StderrMode::Capture => {
        // Only the stdout task may hold a sender, or the channel never closes.
        drop(tx);
        tokio::spawn(read_all(stderr))
      }
    };

    Ok(OutputLines {
      command: command.to_string(),
      stderr_mode: command.stderr,
      child,
      rx,
      readers: Some((stdout_task, stderr_task)),
      finished: false,
    })
  }
}

/// The output of one running command.
///
/// Yields lines lazily as the child writes them. Once the child closes its
/// pipes the stream waits for it to exit and reports a non-zero status as the
/// final item. The stream is single-use; dropping it early kills the child.
pub struct OutputLines {
  command: String,
  stderr_mode: StderrMode,
  child: Child,
  rx: mpsc::Receiver<String>,
  readers: Option<(JoinHandle<io::Result<()>>, JoinHandle<io::Result<String>>)>,
  finished: bool,
}

impl OutputLines {
  /// Next output line, without its line terminator.
  ///
  /// Returns `Ok(None)` once the output is exhausted and the child exited
  /// successfully. A failed command returns [`ProcessError::Failed`] in place
  /// of `None`, after every line has been yielded.
  pub async fn next_line(&mut self) -> Result<Option<String>, ProcessError> {
    if self.finished {
      return Ok(None);
    }

    if let Some(line) = self.rx.recv().await {
      return Ok(Some(line));
    }

    self.finished = true;
    self.finish().await?;
    Ok(None)
  }

  async fn finish(&mut self) -> Result<(), ProcessError> {
    let captured = match self.readers.take() {
      Some((stdout_task, stderr_task)) => {
        join_reader(stdout_task).await?;
        join_reader(stderr_task).await?
      }
      None => String::new(),
    };

    let status = self.child.wait().await?;

    if status.success() {
      // Warnings from a successful tool still reach the user.
      if self.stderr_mode == StderrMode::Capture && !captured.trim().is_empty() {
        warn!(command = %self.command, "command succeeded with output on stderr:\n{}", captured.trim_end());
      }
      debug!(command = %self.command, "command succeeded");
      return Ok(());
    }

    if self.stderr_mode == StderrMode::Capture {
      error!(command = %self.command, code = ?status.code(), "command failed with error:\n{}", captured.trim_end());
    }

    Err(ProcessError::Failed {
      command: self.command.clone(),
      code: status.code(),
    })
  }
}

async fn join_reader<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
  handle.await.map_err(io::Error::other)?
}

/// Forward every line of `reader` into `tx` until end-of-file.
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<String>) -> io::Result<()>
where
  R: AsyncRead + Unpin,
{
  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();

  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
      return Ok(());
    }
    if tx.send(decode_line(&buf)).await.is_err() {
      // Consumer went away; the child is killed when the stream drops.
      return Ok(());
    }
  }
}

async fn read_all<R>(mut reader: R) -> io::Result<String>
where
  R: AsyncRead + Unpin,
{
  let mut buf = Vec::new();
  reader.read_to_end(&mut buf).await?;
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn decode_line(raw: &[u8]) -> String {
  let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
  let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
  String::from_utf8_lossy(raw).into_owned()
}
