mod build;
mod install;
mod protoc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use crate::output::OutputFormat;

pub use build::{BuildArgs, cmd_build};
pub use install::cmd_install;
pub use protoc::cmd_protoc;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOptions {
  pub dry_run: bool,
  pub format: OutputFormat,
}

/// Commands run strictly one after another, so a single-threaded runtime is enough.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}
