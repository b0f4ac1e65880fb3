//! The publish pipeline.
//!
//! Stages run in a fixed order, each one's postcondition being the next one's
//! precondition:
//!
//! 1. clean: remove output directories, legacy folders and prior archives
//! 2. provision: recreate empty output directories
//! 3. native build: one optimized `cargo build --release`
//! 4. stage artifacts: copy shared libraries into both output directories
//! 5. export: one Godot export per target
//! 6. archive: zip each output directory
//!
//! There are no retries and no rollback. Filesystem errors abort the run;
//! tool failures abort it under [`FailurePolicy::Strict`] and are logged and
//! recorded under [`FailurePolicy::Permissive`].

pub mod archive;
pub mod clean;
pub mod export;
pub mod native;
pub mod plan;
pub mod stage;
pub mod types;

use tracing::info;

use crate::config::{FailurePolicy, Layout};
use crate::process::ProcessRunner;

pub use archive::{archive, archive_target};
pub use clean::{clean, provision};
pub use export::{export_builds, export_invocation};
pub use native::{build_native, native_build_invocation};
pub use plan::{PlanStep, plan};
pub use stage::stage_artifacts;
pub use types::{ArchiveSummary, PublishError, PublishObserver, PublishOptions, PublishReport, Stage, ToolStep};

/// Run the complete pipeline for `layout`.
pub async fn publish<R, O>(
  layout: &Layout,
  runner: &R,
  options: &PublishOptions,
  observer: &mut O,
) -> Result<PublishReport, PublishError>
where
  R: ProcessRunner,
  O: PublishObserver,
{
  info!(
    root = %layout.root.display(),
    policy = ?layout.config.failure_policy,
    parallel_exports = options.parallel_exports,
    "starting publish"
  );

  let mut report = PublishReport::default();

  observer.stage_started(Stage::Clean);
  report.removed = clean(layout)?;

  observer.stage_started(Stage::Provision);
  provision(layout)?;

  observer.stage_started(Stage::NativeBuild);
  report.tools.push(build_native(layout, runner).await?);

  observer.stage_started(Stage::StageArtifacts);
  report.staged = stage_artifacts(layout)?;

  observer.stage_started(Stage::Export);
  report
    .tools
    .extend(export_builds(layout, runner, options.parallel_exports).await?);

  observer.stage_started(Stage::Archive);
  report.archives = archive(layout, observer)?;

  info!(
    staged = report.staged.len(),
    archives = report.archives.len(),
    tolerated_failures = report.tolerated_failures().count(),
    "publish complete"
  );

  Ok(report)
}

/// Apply the failure policy to a finished tool run.
///
/// Successful runs pass. Failed runs become `error()` under the strict policy.
/// Under the permissive one they are only logged; the caller reports them from
/// [`PublishReport::tolerated_failures`].
pub(crate) fn enforce(
  policy: FailurePolicy,
  step: &ToolStep,
  error: impl FnOnce() -> PublishError,
) -> Result<(), PublishError> {
  if step.success {
    return Ok(());
  }

  if policy.is_strict() {
    return Err(error());
  }

  info!(stage = %step.stage, cmd = %step.command, code = ?step.code, "tool failed, continuing");
  Ok(())
}
