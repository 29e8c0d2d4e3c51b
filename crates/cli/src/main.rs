mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{TargetArgs, cmd_apply, cmd_plan, cmd_validate};
use crate::output::{OutputFormat, print_error};

/// redseed - Declarative seeding of tracker reference data
#[derive(Parser)]
#[command(name = "redseed")]
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
  /// Bring the target in line with a desired-state file
  Apply {
    /// Path to the desired-state YAML file
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Show what apply would change without writing anything
  Plan {
    /// Path to the desired-state YAML file
    file: PathBuf,

    #[command(flatten)]
    target: TargetArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Check a desired-state file without contacting any target
  Validate {
    /// Path to the desired-state YAML file
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Apply { file, target, format } => cmd_apply(&file, &target, format),
    Commands::Plan { file, target, format } => cmd_plan(&file, &target, format),
    Commands::Validate { file, format } => cmd_validate(&file, format),
  };

  match result {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
