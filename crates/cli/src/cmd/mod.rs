mod clean;
mod plan;
mod publish;

use anyhow::{Context, Result};
use tracing::debug;

use bitpub_lib::config::{FailurePolicy, Layout, PublishConfig};

use crate::ProjectArgs;

pub use clean::cmd_clean;
pub use plan::cmd_plan;
pub use publish::cmd_publish;

/// Resolve the project root and configuration from command-line options.
///
/// Precedence, lowest first: defaults, config file, environment, flags.
fn load_layout(args: &ProjectArgs) -> Result<Layout> {
  let root = match &args.root {
    Some(root) => root.clone(),
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };
  let root = dunce::canonicalize(&root).with_context(|| format!("Project root not found: {}", root.display()))?;

  let mut config = PublishConfig::load(&root, args.config.as_deref()).context("Failed to load configuration")?;

  if let Some(godot) = &args.godot {
    config.godot_bin = godot.clone();
  }
  if let Some(cargo) = &args.cargo {
    config.cargo_bin = cargo.clone();
  }
  if args.permissive {
    config.failure_policy = FailurePolicy::Permissive;
  }

  debug!(root = %root.display(), ?config, "resolved configuration");
  Layout::new(&root, config).context("Invalid configuration")
}
