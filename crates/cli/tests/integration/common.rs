//! Shared test helpers for CLI integration tests.

use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Records its invocation, creates the clone target, and honors FAKE_GIT_EXIT.
const FAKE_GIT: &str = r#"#!/bin/sh
echo "$(pwd -P)|git $*" >> "$FAKE_TOOL_LOG"
for last in "$@"; do :; done
mkdir -p "$last" && touch "$last/CMakeLists.txt"
echo "Cloning into '$last'..."
exit "${FAKE_GIT_EXIT:-0}"
"#;

/// Configure honors FAKE_CMAKE_CONFIGURE_EXIT; `--build` honors FAKE_CMAKE_BUILD_EXIT.
const FAKE_CMAKE: &str = r#"#!/bin/sh
echo "$(pwd -P)|cmake $*" >> "$FAKE_TOOL_LOG"
if [ "$1" = "--build" ]; then
  echo "[100%] Built target fake"
  exit "${FAKE_CMAKE_BUILD_EXIT:-0}"
fi
echo "-- Configuring done"
if [ -n "$FAKE_CMAKE_CONFIGURE_EXIT" ]; then
  echo "CMake Error: fake configure failure" >&2
  exit "$FAKE_CMAKE_CONFIGURE_EXIT"
fi
"#;

/// Writes two empty binding files into --cpp_out, or fails with FAKE_PROTOC_ERROR.
const FAKE_PROTOC: &str = r#"#!/bin/sh
echo "$(pwd -P)|protoc $*" >> "$FAKE_TOOL_LOG"
if [ -n "$FAKE_PROTOC_ERROR" ]; then
  echo "$FAKE_PROTOC_ERROR" >&2
  exit 3
fi
for arg in "$@"; do
  case "$arg" in
    --cpp_out=*) out="${arg#--cpp_out=}" ;;
  esac
done
touch "$out/timer.pb.h" "$out/timer.pb.cc"
"#;

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub cwd: PathBuf,
  pub command: String,
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the fake tools, their
/// invocation log, and the three cache roots.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };

    std::fs::create_dir_all(env.bin_dir()).unwrap();
    env.write_script("git", FAKE_GIT);
    env.write_script("cmake", FAKE_CMAKE);
    env.write_script("protoc", FAKE_PROTOC);

    env
  }

  fn write_script(&self, name: &str, content: &str) {
    let path = self.bin_dir().join(name);
    std::fs::write(&path, content).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.temp.path().join("bin")
  }

  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("calls.log")
  }

  pub fn src_root(&self) -> PathBuf {
    self.temp.path().join("src")
  }

  pub fn build_root(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  pub fn install_root(&self) -> PathBuf {
    self.temp.path().join("install")
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Canonical form of `path`, matching what `pwd -P` reports.
  pub fn canonical(&self, path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
  }

  /// Tool invocations in the order they happened.
  pub fn calls(&self) -> Vec<Call> {
    let Ok(log) = std::fs::read_to_string(self.log_path()) else {
      return Vec::new();
    };
    log
      .lines()
      .map(|line| {
        let (cwd, command) = line.split_once('|').expect("malformed log line");
        Call {
          cwd: PathBuf::from(cwd),
          command: command.to_string(),
        }
      })
      .collect()
  }

  /// Arguments for `build <library>` against this environment's cache roots.
  pub fn build_args(&self, library: &str) -> Vec<OsString> {
    vec![
      "build".into(),
      library.into(),
      format!("https://example.com/{}.git", library).into(),
      "v1.3".into(),
      self.src_root().into(),
      self.build_root().into(),
      self.install_root().into(),
      "4".into(),
    ]
  }

  /// Get a pre-configured Command for the depcache binary.
  ///
  /// Puts the fake tools first on `PATH`, points them at the log file, and
  /// pins logging to the default `info` level.
  pub fn depcache_cmd(&self) -> Command {
    let mut paths = vec![self.bin_dir()];
    if let Some(path) = std::env::var_os("PATH") {
      paths.extend(std::env::split_paths(&path));
    }

    let mut cmd: Command = cargo_bin_cmd!("depcache");
    cmd.env("PATH", std::env::join_paths(paths).unwrap());
    cmd.env("FAKE_TOOL_LOG", self.log_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
