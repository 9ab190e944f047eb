//! Library build and install orchestration.
//!
//! A build is a fixed sequence of external steps run one after another:
//! 1. `git clone` into the source cache (skipped in offline mode)
//! 2. `cmake` configure into the build cache
//! 3. `cmake --build` in Release mode
//!
//! Installing runs the `install` target of an existing build tree. A failing
//! step aborts the sequence; later steps are never issued and nothing that
//! was already created is rolled back.

pub mod commands;

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::cache::{self, CacheLayout, CacheLock, CacheLockError, ensure_dir};
use crate::process::{CommandSpec, Executor, LineSink, ProcessError};

pub use commands::{build_command, clone_command, configure_command, install_command};

/// Errors that can occur while building or installing a library.
#[derive(Debug, Error)]
pub enum LibraryError {
  /// The name cannot be used as a cache directory name.
  #[error("invalid library name '{0}': must be a single path component")]
  InvalidName(String),

  /// A cache directory could not be created.
  #[error("failed to create cache directory '{0}': {1}")]
  CreateDir(PathBuf, #[source] std::io::Error),

  /// Another invocation holds the library's cache lock.
  #[error(transparent)]
  Lock(#[from] CacheLockError),

  /// An external step failed.
  #[error(transparent)]
  Process(#[from] ProcessError),
}

impl LibraryError {
  /// Exit code of the failing external command, if that is what failed.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      LibraryError::Process(e) => e.exit_code(),
      _ => None,
    }
  }
}

/// One external step of a build or install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
  Clone,
  Configure,
  Build,
  Install,
}

impl Step {
  pub fn as_str(&self) -> &'static str {
    match self {
      Step::Clone => "clone",
      Step::Configure => "configure",
      Step::Build => "build",
      Step::Install => "install",
    }
  }
}

impl std::fmt::Display for Step {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What to build and where.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  pub library: String,
  pub repo_url: String,
  /// Tag or branch passed to `git clone --branch`.
  pub version: String,
  pub cache: CacheLayout,
  /// Job count handed to git and cmake.
  pub parallel: u32,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub recurse_submodules: bool,
  /// Extra arguments for the configure step, passed through verbatim.
  pub cmake_args: Vec<String>,
  /// Reuse whatever is already in the source cache instead of cloning.
  pub offline: bool,
}

/// Timing and command line of a completed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub step: Step,
  pub command: String,
  pub cwd: Option<PathBuf>,
  pub duration_ms: u64,
}

/// Summary of the steps that ran for one library.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub library: String,
  pub steps: Vec<StepReport>,
}

impl RunReport {
  fn new(library: &str) -> Self {
    Self {
      library: library.to_string(),
      steps: Vec::new(),
    }
  }

  pub fn ran(&self, step: Step) -> bool {
    self.steps.iter().any(|s| s.step == step)
  }

  pub fn total_duration(&self) -> Duration {
    Duration::from_millis(self.steps.iter().map(|s| s.duration_ms).sum())
  }
}

/// Clone, configure, and build a library into the cache.
///
/// Creates `<source_root>/<library>`, `<build_root>/<library>`, and the
/// install root if missing. Unless the executor is a dry run, the library's
/// cache lock is held for the whole sequence.
pub async fn build_library<E: Executor>(
  executor: &mut E,
  sink: &mut dyn LineSink,
  request: &BuildRequest,
  options: &BuildOptions,
) -> Result<RunReport, LibraryError> {
  let name = request.library.as_str();
  validate_name(name)?;

  let source_dir = request.cache.source_dir(name);
  let build_dir = request.cache.build_dir(name);

  for dir in [source_dir.as_path(), build_dir.as_path(), request.cache.install_dir()] {
    ensure_dir(dir).map_err(|e| LibraryError::CreateDir(dir.to_path_buf(), e))?;
  }

  let _lock = lock_unless_dry_run(executor, &request.cache.build_root, name, "build")?;

  info!(
    library = name,
    version = %request.version,
    source_dir = %source_dir.display(),
    build_dir = %build_dir.display(),
    parallel = request.parallel,
    offline = options.offline,
    "building library"
  );

  let mut report = RunReport::new(name);

  if options.offline {
    info!(library = name, source_dir = %source_dir.display(), "offline mode, skipping clone");
  } else {
    let clone = clone_command(
      &request.repo_url,
      &request.version,
      &source_dir,
      request.parallel,
      options.recurse_submodules,
    );
    run_step(executor, sink, &mut report, Step::Clone, clone).await?;
  }

  let configure = configure_command(&source_dir, &build_dir, &options.cmake_args);
  run_step(executor, sink, &mut report, Step::Configure, configure).await?;

  let build = build_command(&build_dir, request.parallel);
  run_step(executor, sink, &mut report, Step::Build, build).await?;

  info!(library = name, elapsed_ms = report.total_duration().as_millis() as u64, "library built");
  Ok(report)
}

/// Run the `install` target of a library's existing build tree.
///
/// Does not check that the library was built first; cmake reports that.
pub async fn install_library<E: Executor>(
  executor: &mut E,
  sink: &mut dyn LineSink,
  library: &str,
  build_root: &Path,
  parallel: u32,
) -> Result<RunReport, LibraryError> {
  validate_name(library)?;

  let build_dir = cache::build_dir(build_root, library);
  let _lock = lock_unless_dry_run(executor, build_root, library, "install")?;

  info!(library, build_dir = %build_dir.display(), parallel, "installing library");

  let mut report = RunReport::new(library);
  run_step(executor, sink, &mut report, Step::Install, install_command(&build_dir, parallel)).await?;

  Ok(report)
}

/// The name must join onto a cache root as exactly one normal component, so
/// `..`, absolute paths and Windows prefixes like `C:` are rejected.
fn validate_name(name: &str) -> Result<(), LibraryError> {
  let mut components = Path::new(name).components();
  let single_normal = matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(_)), None)
  );
  if !single_normal || name.contains(['/', '\\']) {
    return Err(LibraryError::InvalidName(name.to_string()));
  }
  Ok(())
}

fn lock_unless_dry_run<E: Executor>(
  executor: &E,
  build_root: &Path,
  library: &str,
  command: &str,
) -> Result<Option<CacheLock>, LibraryError> {
  if executor.is_dry_run() {
    return Ok(None);
  }
  Ok(Some(CacheLock::acquire(build_root, library, command)?))
}

async fn run_step<E: Executor>(
  executor: &mut E,
  sink: &mut dyn LineSink,
  report: &mut RunReport,
  step: Step,
  command: CommandSpec,
) -> Result<(), LibraryError> {
  info!(library = %report.library, step = %step, "starting step");

  let started = Instant::now();
  executor.execute(&command, sink).await?;

  report.steps.push(StepReport {
    step,
    command: command.to_string(),
    cwd: command.cwd.clone(),
    duration_ms: started.elapsed().as_millis() as u64,
  });

  Ok(())
}
