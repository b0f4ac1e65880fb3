//! Native library build.
//!
//! A single optimized release build of the GDNative library serves both the
//! release and the debug distributable.

use tracing::info;

use crate::config::Layout;
use crate::process::{Invocation, ProcessRunner};
use crate::publish::enforce;
use crate::publish::types::{PublishError, Stage, ToolStep};

/// Environment overrides for the native build: one codegen unit and fat LTO.
pub const NATIVE_BUILD_ENV: [(&str, &str); 2] =
  [("RUSTFLAGS", "-C codegen-units=1"), ("CARGO_PROFILE_RELEASE_LTO", "fat")];

/// The compiler invocation for the native build.
pub fn native_build_invocation(layout: &Layout) -> Invocation {
  NATIVE_BUILD_ENV.iter().fold(
    Invocation::new(&layout.config.cargo_bin, layout.native_dir())
      .arg("build")
      .arg("--release"),
    |invocation, (key, value)| invocation.env(*key, *value),
  )
}

/// Run the native build.
///
/// Under the strict policy a non-zero exit is [`PublishError::NativeBuildFailed`].
pub async fn build_native<R: ProcessRunner>(layout: &Layout, runner: &R) -> Result<ToolStep, PublishError> {
  let invocation = native_build_invocation(layout);
  let outcome = runner.run(&invocation).await?;
  let step = ToolStep::new(Stage::NativeBuild, None, &invocation, outcome);

  enforce(layout.config.failure_policy, &step, || PublishError::NativeBuildFailed {
    cmd: step.command.clone(),
    code: step.code,
  })?;

  info!(success = step.success, "native build finished");
  Ok(step)
}
