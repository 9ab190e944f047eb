//! Protocol-buffer binding generation via an external `protoc`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::cache::ensure_dir;
use crate::process::{CommandSpec, Executor, LineSink, ProcessError, StderrMode};

#[derive(Debug, Error)]
pub enum ProtocError {
  #[error("failed to create bindings directory '{0}': {1}")]
  CreateDir(PathBuf, #[source] std::io::Error),

  #[error(transparent)]
  Process(#[from] ProcessError),
}

impl ProtocError {
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ProtocError::Process(e) => e.exit_code(),
      ProtocError::CreateDir(..) => None,
    }
  }
}

/// The `protoc` invocation for one definition file.
///
/// The file's own directory is the import root, so sibling imports resolve.
pub fn protoc_command(protoc: &Path, input: &Path, out_dir: &Path) -> CommandSpec {
  let proto_path = match input.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  CommandSpec::new(protoc.to_string_lossy())
    .arg(format!("--cpp_out={}", out_dir.display()))
    .arg(format!("--proto_path={}", proto_path.display()))
    .path_arg(input)
    .stderr(StderrMode::Capture)
}

/// Generate C++ bindings for `input` into `out_dir`.
pub async fn generate_bindings<E: Executor>(
  executor: &mut E,
  sink: &mut dyn LineSink,
  protoc: &Path,
  input: &Path,
  out_dir: &Path,
) -> Result<(), ProtocError> {
  ensure_dir(out_dir).map_err(|e| ProtocError::CreateDir(out_dir.to_path_buf(), e))?;

  info!(input = %input.display(), out_dir = %out_dir.display(), "generating bindings");
  executor.execute(&protoc_command(protoc, input, out_dir), sink).await?;

  Ok(())
}
