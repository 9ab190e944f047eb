use std::fmt;
use std::path::{Path, PathBuf};

/// How the child's standard error is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StderrMode {
  /// Stderr lines are interleaved into the output stream.
  #[default]
  Merge,
  /// Stderr is collected separately and logged once the command exits: as an
  /// error on failure, as a warning on success.
  Capture,
}

/// A fully-assembled external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub stderr: StderrMode,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      stderr: StderrMode::default(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Append a path argument. Non-UTF-8 paths are converted lossily.
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy())
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn stderr(mut self, mode: StderrMode) -> Self {
    self.stderr = mode;
    self
  }
}

/// Renders the command line for logs and dry runs, quoting arguments that
/// would not survive a round trip through whitespace splitting.
impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(s: &str) -> String {
  let needs_quotes = s.is_empty() || s.starts_with('#') || s.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
  if !needs_quotes {
    return s.to_string();
  }
  if !s.contains('\'') {
    return format!("'{}'", s);
  }
  let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
  format!("\"{}\"", escaped)
}
