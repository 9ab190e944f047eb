//! External process execution.
//!
//! Commands are described by [`CommandSpec`] (program, argument vector,
//! working directory, stderr handling) and run through an [`Executor`]. The
//! real executor, [`ProcessRunner`], streams output lines to a [`LineSink`]
//! as the child produces them and fails with [`ProcessError::Failed`] once
//! the output is drained if the child exited unsuccessfully.

pub mod command;
pub mod executor;
pub mod runner;
pub mod sink;
pub mod tokenize;
pub mod types;

pub use command::{CommandSpec, StderrMode};
pub use executor::{DryRun, Executor};
pub use runner::{OutputLines, ProcessRunner};
pub use sink::{ConsoleSink, LineSink};
pub use tokenize::{TokenizeError, split_args};
pub use types::ProcessError;
