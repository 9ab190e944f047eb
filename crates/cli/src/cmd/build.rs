//! Implementation of the `depcache build` command.
//!
//! Clones a library at a given tag or branch into the source cache, configures
//! it with cmake into the build cache, and builds it in Release mode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use depcache_lib::cache::CacheLayout;
use depcache_lib::library::{BuildOptions, BuildRequest, Step, build_library};
use depcache_lib::process::{DryRun, ProcessRunner, split_args};

use super::{GlobalOptions, runtime};
use crate::output::{format_duration, print_json, print_stat, print_success, print_warning};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Name of the library; used as its cache directory name
  pub repo_name: String,

  /// URL of the git repository to clone
  pub repo_url: String,

  /// Tag or branch to build
  pub library_version: String,

  /// Directory the sources are cloned into (one subdirectory per library)
  pub source_cache_dir: PathBuf,

  /// Directory for build trees (one subdirectory per library)
  pub build_cache_dir: PathBuf,

  /// Directory for installed libraries
  pub install_cache_dir: PathBuf,

  /// Number of parallel jobs for cloning and building
  #[arg(value_parser = clap::value_parser!(u32).range(1..))]
  pub num_parallel: u32,

  /// Recursively clone submodules
  #[arg(long = "recurse_submodules", alias = "recurse-submodules")]
  pub recurse_submodules: bool,

  /// Extra arguments for the cmake configure step, e.g. "-DBUILD_SHARED_LIBS=OFF"
  #[arg(long = "cmake_args", alias = "cmake-args", default_value = "", allow_hyphen_values = true)]
  pub cmake_args: String,

  /// Skip cloning and build whatever is already in the source cache
  #[arg(long = "offline_mode", alias = "offline-mode")]
  pub offline_mode: bool,
}

pub fn cmd_build(args: BuildArgs, global: GlobalOptions) -> Result<()> {
  debug!(?args, "build arguments");

  let cmake_args =
    split_args(&args.cmake_args).with_context(|| format!("Invalid --cmake_args value: {}", args.cmake_args))?;

  let request = BuildRequest {
    library: args.repo_name,
    repo_url: args.repo_url,
    version: args.library_version,
    cache: CacheLayout::new(args.source_cache_dir, args.build_cache_dir, args.install_cache_dir),
    parallel: args.num_parallel,
  };
  let options = BuildOptions {
    recurse_submodules: args.recurse_submodules,
    cmake_args,
    offline: args.offline_mode,
  };

  let mut sink = global.format.sink();
  let rt = runtime()?;
  let report = rt
    .block_on(async {
      if global.dry_run {
        build_library(&mut DryRun, sink.as_mut(), &request, &options).await
      } else {
        build_library(&mut ProcessRunner::new(), sink.as_mut(), &request, &options).await
      }
    })
    .with_context(|| format!("Failed to build {}", request.library))?;

  if global.format.is_json() {
    return print_json(&report);
  }

  println!();
  if global.dry_run {
    print_warning("Dry run: no commands were executed");
  }
  print_success(&format!(
    "Built {} {} in {}",
    request.library,
    request.version,
    format_duration(report.total_duration())
  ));
  print_stat("Source", &request.cache.source_dir(&request.library).display().to_string());
  print_stat("Build", &request.cache.build_dir(&request.library).display().to_string());
  print_stat("Install", &request.cache.install_dir().display().to_string());
  if !report.ran(Step::Clone) {
    print_stat("Clone", "skipped (offline)");
  }

  Ok(())
}
