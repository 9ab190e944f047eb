//! Implementation of the `depcache install` command.

use std::path::Path;

use anyhow::{Context, Result};

use depcache_lib::cache;
use depcache_lib::library::install_library;
use depcache_lib::process::{DryRun, ProcessRunner};

use super::{GlobalOptions, runtime};
use crate::output::{format_duration, print_json, print_stat, print_success, print_warning};

/// Run the install target of a library previously built with `depcache build`.
pub fn cmd_install(repo_name: &str, build_cache_dir: &Path, num_parallel: u32, global: GlobalOptions) -> Result<()> {
  let mut sink = global.format.sink();
  let rt = runtime()?;
  let report = rt
    .block_on(async {
      if global.dry_run {
        install_library(&mut DryRun, sink.as_mut(), repo_name, build_cache_dir, num_parallel).await
      } else {
        install_library(&mut ProcessRunner::new(), sink.as_mut(), repo_name, build_cache_dir, num_parallel).await
      }
    })
    .with_context(|| format!("Failed to install {}", repo_name))?;

  if global.format.is_json() {
    return print_json(&report);
  }

  println!();
  if global.dry_run {
    print_warning("Dry run: no commands were executed");
  }
  print_success(&format!(
    "Installed {} in {}",
    repo_name,
    format_duration(report.total_duration())
  ));
  print_stat(
    "Build",
    &cache::build_dir(build_cache_dir, repo_name).display().to_string(),
  );

  Ok(())
}
