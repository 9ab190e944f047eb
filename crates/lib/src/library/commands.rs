//! Argument vectors for each external step.
//!
//! These are pure: they only assemble [`CommandSpec`]s and never touch the
//! filesystem.

use std::path::Path;

use crate::process::CommandSpec;

pub const GIT: &str = "git";
pub const CMAKE: &str = "cmake";
pub const BUILD_CONFIG: &str = "Release";

/// Shallow clone of `version` into `source_dir`.
pub fn clone_command(
  url: &str,
  version: &str,
  source_dir: &Path,
  parallel: u32,
  recurse_submodules: bool,
) -> CommandSpec {
  let mut cmd = CommandSpec::new(GIT).args(["clone", "--branch", version, "--depth", "1"]);
  if recurse_submodules {
    cmd = cmd.arg("--recurse-submodules");
  }
  cmd.arg(format!("-j{}", parallel)).arg(url).path_arg(source_dir)
}

/// Configure `source_dir`, writing the build tree into `build_dir`.
///
/// `extra_args` are passed through verbatim before the source directory.
pub fn configure_command(source_dir: &Path, build_dir: &Path, extra_args: &[String]) -> CommandSpec {
  CommandSpec::new(CMAKE)
    .args(extra_args.iter().cloned())
    .path_arg(source_dir)
    .current_dir(build_dir)
}

pub fn build_command(build_dir: &Path, parallel: u32) -> CommandSpec {
  CommandSpec::new(CMAKE)
    .args(["--build", ".", "--config", BUILD_CONFIG, "--parallel"])
    .arg(parallel.to_string())
    .current_dir(build_dir)
}

pub fn install_command(build_dir: &Path, parallel: u32) -> CommandSpec {
  CommandSpec::new(CMAKE)
    .args(["--build", ".", "--target", "install", "--config", BUILD_CONFIG, "--parallel"])
    .arg(parallel.to_string())
    .current_dir(build_dir)
}
