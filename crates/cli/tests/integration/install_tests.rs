//! Install command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn install_runs_install_target_in_build_dir() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.build_root().join("zlib")).unwrap();

  env
    .depcache_cmd()
    .arg("install")
    .arg("zlib")
    .arg(env.build_root())
    .arg("2")
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed zlib"));

  let calls = env.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(
    calls[0].command,
    "cmake --build . --target install --config Release --parallel 2"
  );
  assert_eq!(calls[0].cwd, env.canonical(&env.build_root().join("zlib")));
}

#[test]
fn install_after_build_uses_same_build_tree() {
  let env = TestEnv::new();

  env.depcache_cmd().args(env.build_args("zlib")).assert().success();
  env
    .depcache_cmd()
    .arg("install")
    .arg("zlib")
    .arg(env.build_root())
    .arg("4")
    .assert()
    .success();

  let calls = env.calls();
  assert_eq!(calls.len(), 4);
  assert_eq!(calls[3].cwd, calls[2].cwd);
  assert!(calls[3].command.contains("--target install"));
}

#[test]
fn install_without_build_tree_fails() {
  let env = TestEnv::new();

  env
    .depcache_cmd()
    .arg("install")
    .arg("zlib")
    .arg(env.build_root())
    .arg("2")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to start 'cmake'"));

  assert!(env.calls().is_empty());
}

#[test]
fn failed_install_passes_exit_code() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.build_root().join("zlib")).unwrap();

  env
    .depcache_cmd()
    .arg("install")
    .arg("zlib")
    .arg(env.build_root())
    .arg("2")
    .env("FAKE_CMAKE_BUILD_EXIT", "2")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Failed to install zlib"));
}
