//! Implementation of the `depcache protoc` command.

use std::path::Path;

use anyhow::{Context, Result};

use depcache_lib::process::{DryRun, ProcessRunner};
use depcache_lib::protoc::generate_bindings;

use super::{GlobalOptions, runtime};
use crate::output::{print_json, print_stat, print_success, print_warning};

/// Generate C++ bindings for one `.proto` file.
pub fn cmd_protoc(protoc_path: &Path, proto_input_path: &Path, proto_bindings_dir: &Path, global: GlobalOptions) -> Result<()> {
  let mut sink = global.format.sink();
  let rt = runtime()?;
  rt.block_on(async {
    if global.dry_run {
      generate_bindings(&mut DryRun, sink.as_mut(), protoc_path, proto_input_path, proto_bindings_dir).await
    } else {
      generate_bindings(
        &mut ProcessRunner::new(),
        sink.as_mut(),
        protoc_path,
        proto_input_path,
        proto_bindings_dir,
      )
      .await
    }
  })
  .with_context(|| format!("Failed to generate bindings for {}", proto_input_path.display()))?;

  if global.format.is_json() {
    return print_json(&serde_json::json!({
      "input": proto_input_path,
      "bindings_dir": proto_bindings_dir,
      "dry_run": global.dry_run,
    }));
  }

  if global.dry_run {
    print_warning("Dry run: protoc was not executed");
  }
  print_success(&format!("Generated bindings for {}", proto_input_path.display()));
  print_stat("Output", &proto_bindings_dir.display().to_string());

  Ok(())
}
