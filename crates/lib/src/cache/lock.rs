//! Per-library file locks so two invocations never build into the same
//! cache directory at once.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{ensure_dir, lock_path};
use crate::consts::{APP_NAME, LOCK_METADATA_VERSION};

#[derive(Debug, Serialize, Deserialize)]
pub struct LockMetadata {
  pub version: u32,
  pub pid: u32,
  pub started_at_unix: u64,
  pub command: String,
  pub library: String,
}

#[derive(Debug, Error)]
pub enum CacheLockError {
  #[error(
    "Library '{library}' is locked by another process: {command} (PID {pid}, started {started_at})\n\
             If you're sure no {app} process is running, remove the lock file:\n  {path}",
    app = APP_NAME,
    path = .lock_path.display()
  )]
  Contention {
    library: String,
    command: String,
    pid: u32,
    started_at: String,
    lock_path: PathBuf,
  },

  #[error(
    "Library '{library}' is locked (could not read lock metadata)\n\
             If you're sure no {app} process is running, remove the lock file:\n  {path}",
    app = APP_NAME,
    path = .lock_path.display()
  )]
  ContentionUnknown { library: String, lock_path: PathBuf },

  #[error("Failed to create build cache directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("Failed to open lock file: {0}")]
  OpenFile(#[source] io::Error),

  #[error("Failed to write lock metadata: {0}")]
  WriteMetadata(#[source] io::Error),

  #[error("Failed to acquire lock: {0}")]
  LockFailed(#[source] io::Error),
}

/// An exclusive lock on one library's build directory, released on drop.
///
/// The lock file itself is left in place; only the OS-level lock is released.
#[derive(Debug)]
pub struct CacheLock {
  file: File,
  lock_path: PathBuf,
}

impl CacheLock {
  /// Take the lock for `library` under `build_root` without waiting.
  ///
  /// `command` is recorded in the lock file so a contending process can say
  /// who holds it.
  pub fn acquire(build_root: &Path, library: &str, command: &str) -> Result<Self, CacheLockError> {
    let lock_path = lock_path(build_root, library);

    ensure_dir(build_root).map_err(CacheLockError::CreateDir)?;

    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(&lock_path)
      .map_err(CacheLockError::OpenFile)?;

    if let Err(err) = try_lock(&file) {
      if err.kind() == io::ErrorKind::WouldBlock {
        return Err(Self::read_contention_error(&lock_path, library));
      }
      return Err(CacheLockError::LockFailed(err));
    }

    Self::write_metadata(&file, command, library)?;
    debug!(path = %lock_path.display(), library, "acquired cache lock");

    Ok(CacheLock { file, lock_path })
  }

  /// Reads the lock metadata through the held file handle.
  ///
  /// Opening a second handle would fail on Windows, where locks are mandatory.
  pub fn read_metadata(&self) -> io::Result<LockMetadata> {
    use std::io::{Seek, SeekFrom};

    let mut file = &self.file;
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
  }

  pub fn lock_path(&self) -> &Path {
    &self.lock_path
  }

  fn write_metadata(file: &File, command: &str, library: &str) -> Result<(), CacheLockError> {
    let metadata = LockMetadata {
      version: LOCK_METADATA_VERSION,
      pid: std::process::id(),
      started_at_unix: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs(),
      command: command.to_string(),
      library: library.to_string(),
    };

    file.set_len(0).map_err(CacheLockError::WriteMetadata)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &metadata)
      .map_err(|e| CacheLockError::WriteMetadata(io::Error::other(e)))?;
    writer.flush().map_err(CacheLockError::WriteMetadata)?;

    Ok(())
  }

  fn read_contention_error(lock_path: &Path, library: &str) -> CacheLockError {
    if let Ok(mut file) = File::open(lock_path) {
      let mut contents = String::new();
      if file.read_to_string(&mut contents).is_ok()
        && let Ok(metadata) = serde_json::from_str::<LockMetadata>(&contents)
      {
        return CacheLockError::Contention {
          library: library.to_string(),
          command: metadata.command,
          pid: metadata.pid,
          started_at: format!("Unix timestamp {}", metadata.started_at_unix),
          lock_path: lock_path.to_path_buf(),
        };
      }
    }

    CacheLockError::ContentionUnknown {
      library: library.to_string(),
      lock_path: lock_path.to_path_buf(),
    }
  }
}

#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<()> {
  use rustix::fs::{FlockOperation, flock};
  use std::os::unix::io::AsFd;

  flock(file.as_fd(), FlockOperation::NonBlockingLockExclusive).map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(windows)]
fn try_lock(file: &File) -> io::Result<()> {
  use std::os::windows::io::AsRawHandle;
  use windows_sys::Win32::Foundation::HANDLE;
  use windows_sys::Win32::Storage::FileSystem::{LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx};

  let handle = file.as_raw_handle() as HANDLE;

  // SAFETY: OVERLAPPED is a plain data struct that is valid when zero-initialized.
  // LockFileEx is safe to call with a valid file handle and zeroed OVERLAPPED.
  let result = unsafe {
    let mut overlapped = std::mem::zeroed();
    LockFileEx(
      handle,
      LOCKFILE_FAIL_IMMEDIATELY | LOCKFILE_EXCLUSIVE_LOCK,
      0,
      1,
      0,
      &mut overlapped,
    )
  };

  if result == 0 {
    let err = io::Error::last_os_error();
    // ERROR_LOCK_VIOLATION is how Windows reports a held lock.
    if err.raw_os_error() == Some(33) {
      return Err(io::Error::from(io::ErrorKind::WouldBlock));
    }
    Err(err)
  } else {
    Ok(())
  }
}
