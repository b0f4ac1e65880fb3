//! Implementation of the `bitpub clean` command.

use anyhow::{Context, Result};

use bitpub_lib::publish::clean;

use crate::ProjectArgs;
use crate::output::{OutputFormat, print_info, print_json, print_removed, print_success};

use super::load_layout;

/// Remove output directories, legacy folders and archives.
pub fn cmd_clean(project: &ProjectArgs, output: OutputFormat) -> Result<()> {
  let layout = load_layout(project)?;
  let removed = clean(&layout).context("Clean failed")?;

  if output.is_json() {
    return print_json(&serde_json::json!({ "removed": removed }));
  }

  if removed.is_empty() {
    print_info("Nothing to clean.");
    return Ok(());
  }

  for path in &removed {
    print_removed(&path.display().to_string());
  }
  print_success(&format!("Removed {} path(s)", removed.len()));

  Ok(())
}
