//! Dry-run description of a publish.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{Layout, TargetKind};
use crate::process::Invocation;
use crate::publish::export::export_invocation;
use crate::publish::native::native_build_invocation;
use crate::publish::types::Stage;

/// One step a publish would take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanStep {
  Remove { path: PathBuf },
  CreateDir { path: PathBuf },
  Run { stage: Stage, invocation: Invocation },
  Copy { from: PathBuf, pattern: String, to: Vec<PathBuf> },
  Archive { target: TargetKind, from: PathBuf, to: PathBuf },
}

impl PlanStep {
  pub fn stage(&self) -> Stage {
    match self {
      PlanStep::Remove { .. } => Stage::Clean,
      PlanStep::CreateDir { .. } => Stage::Provision,
      PlanStep::Run { stage, .. } => *stage,
      PlanStep::Copy { .. } => Stage::StageArtifacts,
      PlanStep::Archive { .. } => Stage::Archive,
    }
  }
}

impl fmt::Display for PlanStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlanStep::Remove { path } => write!(f, "remove {} (if present)", path.display()),
      PlanStep::CreateDir { path } => write!(f, "create {}", path.display()),
      PlanStep::Run { invocation, .. } => write!(f, "run `{}` in {}", invocation, invocation.cwd.display()),
      PlanStep::Copy { from, pattern, to } => {
        let dests: Vec<_> = to.iter().map(|p| p.display().to_string()).collect();
        write!(f, "copy {} from {} to {}", pattern, from.display(), dests.join(", "))
      }
      PlanStep::Archive { from, to, .. } => write!(f, "zip {} into {}", from.display(), to.display()),
    }
  }
}

/// Every step a publish of `layout` would take, in order.
///
/// Pure: nothing is read from or written to disk and no tool is launched.
pub fn plan(layout: &Layout) -> Vec<PlanStep> {
  let mut steps: Vec<PlanStep> = layout
    .clean_paths()
    .into_iter()
    .map(|path| PlanStep::Remove { path })
    .collect();

  for target in layout.targets() {
    steps.push(PlanStep::CreateDir {
      path: target.output_dir.clone(),
    });
  }

  steps.push(PlanStep::Run {
    stage: Stage::NativeBuild,
    invocation: native_build_invocation(layout),
  });

  steps.push(PlanStep::Copy {
    from: layout.source_dll_dir(),
    pattern: layout.config.library_pattern.clone(),
    to: layout.targets().iter().map(|t| t.output_dir.clone()).collect(),
  });

  for target in layout.targets() {
    steps.push(PlanStep::Run {
      stage: Stage::Export,
      invocation: export_invocation(layout, target),
    });
  }

  for target in layout.targets() {
    steps.push(PlanStep::Archive {
      target: target.kind,
      from: target.output_dir.clone(),
      to: target.archive_path.clone(),
    });
  }

  steps
}
