//! Implementation of the `bitpub publish` command.
//!
//! Runs the whole pipeline against real cargo and Godot binaries and prints a
//! summary of what was produced.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use bitpub_lib::config::BuildTarget;
use bitpub_lib::process::{ChildStdout, SystemRunner};
use bitpub_lib::publish::{ArchiveSummary, PublishObserver, PublishOptions, PublishReport, Stage, publish};

use crate::{ProjectArgs, PublishArgs};
use crate::output::{
  OutputFormat, format_bytes, format_duration, print_info, print_json, print_stat, print_success, print_warning,
};

use super::load_layout;

/// Prints stage progress as the pipeline runs.
struct ConsoleProgress;

impl PublishObserver for ConsoleProgress {
  fn stage_started(&mut self, stage: Stage) {
    // Archive progress is reported per target below.
    if stage != Stage::Archive {
      print_info(&format!("{}...", capitalize(stage.as_str())));
    }
  }

  fn archive_started(&mut self, target: &BuildTarget) {
    print_info(&format!("Zipping {}...", target.name));
  }

  fn archive_written(&mut self, summary: &ArchiveSummary) {
    print_success(&format!(
      "Success. {} ({} files, {})",
      summary.path.display(),
      summary.files,
      format_bytes(summary.bytes)
    ));
  }
}

/// The JSON document printed by `publish -o json`.
#[derive(Serialize)]
struct JsonReport<'a> {
  #[serde(flatten)]
  report: &'a PublishReport,
  elapsed_ms: u64,
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Execute the publish command.
pub fn cmd_publish(project: &ProjectArgs, args: PublishArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let layout = load_layout(project)?;
  let options = PublishOptions {
    parallel_exports: args.parallel_exports,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = if output.is_json() {
    // Tool chatter must not end up in the JSON document.
    let runner = SystemRunner::new(ChildStdout::Stderr);
    rt.block_on(publish(&layout, &runner, &options, &mut ()))
  } else {
    rt.block_on(publish(&layout, &SystemRunner::default(), &options, &mut ConsoleProgress))
  }
  .context("Publish failed")?;

  if output.is_json() {
    return print_json(&JsonReport {
      report: &report,
      elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    });
  }

  for step in report.tolerated_failures() {
    print_warning(&format!(
      "{} exited with code {:?}, output may be incomplete: {}",
      step.stage, step.code, step.command
    ));
  }

  println!();
  print_success("Publish complete!");
  print_stat("Libraries staged", &report.staged.len().to_string());
  print_stat("Paths cleaned", &report.removed.len().to_string());
  for archive in &report.archives {
    print_stat(
      &format!("Archive ({})", archive.target),
      &archive.path.display().to_string(),
    );
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
