mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use podbin_lib::config::Validation;

use crate::output::{OutputFormat, print_error};

/// podbin - Prebuilt binary cache for CocoaPods dependencies
#[derive(Parser)]
#[command(name = "podbin")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ValidationArg {
  /// Trust the cache when every entry exists and the manifest matches
  Existence,
  /// Also decode every archive before trusting the cache
  #[default]
  Integrity,
}

impl From<ValidationArg> for Validation {
  fn from(arg: ValidationArg) -> Self {
    match arg {
      ValidationArg::Existence => Validation::Existence,
      ValidationArg::Integrity => Validation::Integrity,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Restore binaries from the cache, or build and cache them
  Build {
    /// Scheme to build
    #[arg(short, long)]
    scheme: String,

    /// Dependency folder holding Manifest.lock
    #[arg(long, default_value = "Pods")]
    pods_folder: PathBuf,

    /// Project handed to the builder (default: <pods-folder>/Pods.xcodeproj)
    #[arg(long)]
    project: Option<String>,

    /// Directory receiving frameworks, bundles and the cache
    #[arg(long, default_value = "PodsBinaries")]
    output_dir: PathBuf,

    /// Scratch directory for the builder (default: <output-dir>/tmp)
    #[arg(long)]
    build_dir: Option<PathBuf>,

    /// Shell command that performs the build (default: $PODBIN_BUILDER)
    #[arg(long)]
    builder: Option<String>,

    /// Shell used to run the build command
    #[arg(long)]
    shell: Option<String>,

    /// How thoroughly the cache is checked before restoring
    #[arg(long, value_enum, default_value_t = ValidationArg::Integrity)]
    validation: ValidationArg,
  },

  /// Show the state of the cache
  Status {
    /// Dependency folder holding Manifest.lock
    #[arg(long, default_value = "Pods")]
    pods_folder: PathBuf,

    /// Directory receiving frameworks, bundles and the cache
    #[arg(long, default_value = "PodsBinaries")]
    output_dir: PathBuf,
  },

  /// Remove every cache entry
  Clean {
    /// Directory receiving frameworks, bundles and the cache
    #[arg(long, default_value = "PodsBinaries")]
    output_dir: PathBuf,
  },

  /// Print version information
  Version,
}

fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("podbin_lib=debug,podbin=debug")
    } else {
      EnvFilter::new("warn")
    }
  });

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Build {
      scheme,
      pods_folder,
      project,
      output_dir,
      build_dir,
      builder,
      shell,
      validation,
    } => cmd::cmd_build(cmd::BuildArgs {
      scheme,
      pods_folder,
      project,
      output_dir,
      build_dir,
      builder,
      shell,
      validation: validation.into(),
      verbose: cli.verbose,
      output: cli.output,
    }),
    Commands::Status {
      pods_folder,
      output_dir,
    } => cmd::cmd_status(&pods_folder, &output_dir, cli.output),
    Commands::Clean { output_dir } => cmd::cmd_clean(&output_dir, cli.output),
    Commands::Version => cmd::cmd_version(cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
