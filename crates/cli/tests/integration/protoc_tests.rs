//! Protoc command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn protoc_generates_bindings_into_output_dir() {
  let env = TestEnv::new();
  let input = env.write_file("protos/timer.proto", "syntax = \"proto3\";\n");
  let out_dir = env.temp.path().join("gen");

  env
    .depcache_cmd()
    .arg("protoc")
    .arg(env.bin_dir().join("protoc"))
    .arg(&input)
    .arg(&out_dir)
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated bindings"));

  assert!(out_dir.join("timer.pb.h").exists());
  assert!(out_dir.join("timer.pb.cc").exists());

  let calls = env.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(
    calls[0].command,
    format!(
      "protoc --cpp_out={} --proto_path={} {}",
      out_dir.display(),
      env.temp.path().join("protos").display(),
      input.display()
    )
  );
}

#[test]
fn protoc_failure_logs_stderr_and_passes_exit_code() {
  let env = TestEnv::new();
  let input = env.write_file("protos/timer.proto", "not a proto file\n");

  env
    .depcache_cmd()
    .arg("protoc")
    .arg(env.bin_dir().join("protoc"))
    .arg(&input)
    .arg(env.temp.path().join("gen"))
    .env("FAKE_PROTOC_ERROR", "timer.proto:1:1: Expected top-level statement")
    .assert()
    .code(3)
    .stderr(predicate::str::contains("command failed with error"))
    .stderr(predicate::str::contains("Expected top-level statement"));
}
