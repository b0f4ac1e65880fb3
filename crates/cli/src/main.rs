mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// bitpub - package Bitmapflow for Windows distribution
#[derive(Parser)]
#[command(name = "bitpub")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
  output: OutputFormat,

  #[command(flatten)]
  project: ProjectArgs,

  /// Publish options for the bare `bitpub` form
  #[command(flatten)]
  publish: PublishArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

/// Options selecting and overriding the project configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
  /// Project root (default: current directory)
  #[arg(long, global = true)]
  pub root: Option<PathBuf>,

  /// Config file (default: bitpub.toml in the project root, if present)
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Godot binary used for exports
  #[arg(long, global = true)]
  pub godot: Option<String>,

  /// Cargo binary used for the native build
  #[arg(long, global = true)]
  pub cargo: Option<String>,

  /// Keep going when cargo or Godot exit unsuccessfully
  #[arg(long, global = true)]
  pub permissive: bool,
}

/// Options that only affect publishing.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PublishArgs {
  /// Run the release and debug exports concurrently
  #[arg(long)]
  pub parallel_exports: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Clean, build, export and zip both distributables (default)
  Publish(PublishArgs),

  /// Show every step a publish would take without running it
  Plan,

  /// Remove output directories, legacy folders and archives
  Clean,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command.unwrap_or(Commands::Publish(cli.publish)) {
    Commands::Publish(args) => cmd::cmd_publish(&cli.project, args, cli.output),
    Commands::Plan => cmd::cmd_plan(&cli.project, cli.output),
    Commands::Clean => cmd::cmd_clean(&cli.project, cli.output),
  }
}
