mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use depcache_lib::library::LibraryError;
use depcache_lib::process::ProcessError;
use depcache_lib::protoc::ProtocError;

use cmd::{BuildArgs, GlobalOptions};
use output::{OutputFormat, print_error};

/// depcache - build and cache third-party C++ libraries
#[derive(Parser)]
#[command(name = "depcache")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Print the commands that would run without running them
  #[arg(long, global = true)]
  dry_run: bool,

  /// Format of the final summary
  #[arg(long, value_enum, default_value_t, global = true)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Clone, configure, and build a library into the cache
  Build(BuildArgs),

  /// Run the install target of a cached build
  Install {
    /// Name of the library to install
    repo_name: String,

    /// Directory holding the library's build tree
    build_cache_dir: PathBuf,

    /// Number of parallel jobs
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    num_parallel: u32,
  },

  /// Generate C++ bindings from a .proto file
  Protoc {
    /// Path to the protoc binary
    protoc_path: PathBuf,

    /// Path to the input .proto file
    proto_input_path: PathBuf,

    /// Directory where generated bindings are written
    proto_bindings_dir: PathBuf,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  init_tracing(cli.verbose);

  let global = GlobalOptions {
    dry_run: cli.dry_run,
    format: cli.format,
  };

  let result = match cli.command {
    Commands::Build(args) => cmd::cmd_build(args, global),
    Commands::Install {
      repo_name,
      build_cache_dir,
      num_parallel,
    } => cmd::cmd_install(&repo_name, &build_cache_dir, num_parallel, global),
    Commands::Protoc {
      protoc_path,
      proto_input_path,
      proto_bindings_dir,
    } => cmd::cmd_protoc(&protoc_path, &proto_input_path, &proto_bindings_dir, global),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(exit_status(&err))
    }
  }
}

/// Logs go to stderr so stdout only carries tool output and summaries.
fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// A failed external command's exit code is passed through; anything else is 1.
fn exit_status(err: &anyhow::Error) -> u8 {
  err
    .chain()
    .find_map(|cause| {
      if let Some(e) = cause.downcast_ref::<LibraryError>() {
        return e.exit_code();
      }
      if let Some(e) = cause.downcast_ref::<ProtocError>() {
        return e.exit_code();
      }
      cause.downcast_ref::<ProcessError>().and_then(ProcessError::exit_code)
    })
    .and_then(|code| u8::try_from(code).ok())
    .filter(|code| *code != 0)
    .unwrap_or(1)
}
