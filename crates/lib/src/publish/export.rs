//! Godot exports, one per target.

use tracing::{info, warn};

use crate::config::{BuildTarget, Layout};
use crate::process::{Invocation, ProcessOutcome, ProcessRunner};
use crate::publish::enforce;
use crate::publish::types::{PublishError, Stage, ToolStep};
use crate::util::paths::{relative_to, to_slash};

/// The Godot invocation exporting `target`.
///
/// Godot resolves the output path against its project folder, so the path is
/// made relative to the Godot working directory and written with `/`.
pub fn export_invocation(layout: &Layout, target: &BuildTarget) -> Invocation {
  let godot_dir = layout.godot_dir();
  let output = relative_to(&target.executable_path(), &godot_dir);

  Invocation::new(&layout.config.godot_bin, godot_dir)
    .arg("--no-window")
    .arg(target.export_flag())
    .arg(&layout.config.export_preset)
    .arg(to_slash(&output))
}

/// Export both targets, release first.
///
/// Sequential exports stop at the first failure the policy rejects. With
/// `parallel` set both exports run concurrently and are awaited together;
/// their results are then checked release first.
pub async fn export_builds<R: ProcessRunner>(
  layout: &Layout,
  runner: &R,
  parallel: bool,
) -> Result<Vec<ToolStep>, PublishError> {
  let release_inv = export_invocation(layout, &layout.release);
  let debug_inv = export_invocation(layout, &layout.debug);

  if parallel {
    let (release, debug) = tokio::join!(runner.run(&release_inv), runner.run(&debug_inv));
    let (release, debug) = (release?, debug?);
    return Ok(vec![
      settle(layout, &layout.release, &release_inv, release)?,
      settle(layout, &layout.debug, &debug_inv, debug)?,
    ]);
  }

  let release = runner.run(&release_inv).await?;
  let release_step = settle(layout, &layout.release, &release_inv, release)?;

  let debug = runner.run(&debug_inv).await?;
  let debug_step = settle(layout, &layout.debug, &debug_inv, debug)?;

  Ok(vec![release_step, debug_step])
}

fn settle(
  layout: &Layout,
  target: &BuildTarget,
  invocation: &Invocation,
  outcome: ProcessOutcome,
) -> Result<ToolStep, PublishError> {
  let step = ToolStep::new(Stage::Export, Some(target.kind), invocation, outcome);

  enforce(layout.config.failure_policy, &step, || PublishError::ExportFailed {
    target: target.kind,
    cmd: step.command.clone(),
    code: step.code,
  })?;
  check_executable(layout, target, &step)?;

  info!(target = %target.kind, success = step.success, "export finished");
  Ok(step)
}

fn check_executable(layout: &Layout, target: &BuildTarget, step: &ToolStep) -> Result<(), PublishError> {
  let path = target.executable_path();
  if !step.success || path.is_file() {
    return Ok(());
  }

  if layout.config.failure_policy.is_strict() {
    return Err(PublishError::MissingExecutable {
      target: target.kind,
      path,
    });
  }

  warn!(target = %target.kind, path = %path.display(), "export produced no executable, continuing");
  Ok(())
}
