//! Test utilities for depcache-lib.
//!
//! Cross-platform helpers for tests that need to run real commands.

use crate::process::CommandSpec;

/// Returns a command that runs `script` through the platform shell.
#[cfg(unix)]
pub fn sh(script: &str) -> CommandSpec {
  CommandSpec::new("/bin/sh").args(["-c", script])
}

#[cfg(windows)]
pub fn sh(script: &str) -> CommandSpec {
  CommandSpec::new("cmd.exe").args(["/C", script])
}

/// Returns a command that creates an empty file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> CommandSpec {
  CommandSpec::new("touch").arg(filename)
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> CommandSpec {
  // Use PowerShell to create an empty file - more reliable than cmd.exe approaches
  CommandSpec::new("powershell.exe").args([
    "-NoProfile".to_string(),
    "-Command".to_string(),
    format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
  ])
}
