mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// edgestack - Declare and deploy an edge-routed static site
#[derive(Parser)]
#[command(name = "edgestack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the resource graph in memory and print it
  Synth {
    /// Path to the stack configuration (default: stack.lua)
    #[arg(default_value = "stack.lua")]
    config: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Build the resource graph and record it in the stack's state file
  Deploy {
    /// Path to the stack configuration (default: stack.lua)
    #[arg(default_value = "stack.lua")]
    config: PathBuf,

    /// Directory holding stack state files
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print the exports of a deployed stack
  Outputs {
    /// Name of the stack
    stack: String,

    /// Directory holding stack state files
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Print only this export's raw value
    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print the version tag derived from a file or directory
  Version {
    /// Artifact file or directory
    path: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Synth { config, format } => cmd::cmd_synth(&config, format),
    Commands::Deploy {
      config,
      state_dir,
      format,
    } => cmd::cmd_deploy(&config, state_dir, format),
    Commands::Outputs {
      stack,
      state_dir,
      name,
      format,
    } => cmd::cmd_outputs(&stack, state_dir, name.as_deref(), format),
    Commands::Version { path, format } => cmd::cmd_version(&path, format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
