//! Implementation of the `bitpub plan` command.

use anyhow::Result;

use bitpub_lib::publish::plan;

use crate::ProjectArgs;
use crate::output::{OutputFormat, print_info, print_json, print_step};

use super::load_layout;

/// Print every step a publish would take, without touching anything.
pub fn cmd_plan(project: &ProjectArgs, output: OutputFormat) -> Result<()> {
  let layout = load_layout(project)?;
  let steps = plan(&layout);

  if output.is_json() {
    return print_json(&steps);
  }

  print_info(&format!("Publish plan for {}", layout.root.display()));
  for step in &steps {
    print_step(&format!("[{}]", step.stage()), &step.to_string());
  }
  println!();
  print_info(&format!("Failure policy: {:?}", layout.config.failure_policy));

  Ok(())
}
