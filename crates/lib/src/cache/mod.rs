//! On-disk cache layout.
//!
//! Each library gets its own subdirectory under the source and build roots;
//! the install root is shared:
//!
//! ```text
//! <source_root>/<library>/        cloned sources
//! <build_root>/<library>/         cmake build tree
//! <build_root>/<library>.lock     held while a build or install runs
//! <install_root>/                 install prefix chosen by the caller
//! ```

pub mod lock;

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::LOCK_EXTENSION;

pub use lock::{CacheLock, CacheLockError, LockMetadata};

/// Create `path` and any missing ancestors.
///
/// Succeeds without doing anything if the directory already exists. An
/// existing non-directory at `path` is reported as the underlying OS error.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
  if path.is_dir() {
    return Ok(());
  }
  debug!(path = %path.display(), "creating directory");
  std::fs::create_dir_all(path)
}

/// The three cache roots a build works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
  pub source_root: PathBuf,
  pub build_root: PathBuf,
  pub install_root: PathBuf,
}

impl CacheLayout {
  pub fn new(source_root: impl Into<PathBuf>, build_root: impl Into<PathBuf>, install_root: impl Into<PathBuf>) -> Self {
    Self {
      source_root: source_root.into(),
      build_root: build_root.into(),
      install_root: install_root.into(),
    }
  }

  pub fn source_dir(&self, library: &str) -> PathBuf {
    self.source_root.join(library)
  }

  pub fn build_dir(&self, library: &str) -> PathBuf {
    build_dir(&self.build_root, library)
  }

  pub fn install_dir(&self) -> &Path {
    &self.install_root
  }
}

/// Per-library build directory under `build_root`.
pub fn build_dir(build_root: &Path, library: &str) -> PathBuf {
  build_root.join(library)
}

/// Lock file guarding `library`'s build directory.
pub fn lock_path(build_root: &Path, library: &str) -> PathBuf {
  build_root.join(format!("{}.{}", library, LOCK_EXTENSION))
}
