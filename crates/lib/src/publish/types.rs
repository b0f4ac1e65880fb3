//! Types for the publish pipeline.
//!
//! Error, report and stage types shared by the individual stages.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::{BuildTarget, ConfigError, TargetKind};
use crate::process::{Invocation, ProcessError, ProcessOutcome};

/// Errors that can abort a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
  #[error("config error: {0}")]
  Config(#[from] ConfigError),

  /// A tool could not be started at all.
  #[error(transparent)]
  Process(#[from] ProcessError),

  /// A filesystem operation failed.
  #[error("failed to {op} {}: {source}", path.display())]
  Fs {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The native build exited unsuccessfully.
  #[error("native build failed with exit code {code:?}: {cmd}")]
  NativeBuildFailed { cmd: String, code: Option<i32> },

  /// A Godot export exited unsuccessfully.
  #[error("{target} export failed with exit code {code:?}: {cmd}")]
  ExportFailed {
    target: TargetKind,
    cmd: String,
    code: Option<i32>,
  },

  /// The export claimed success but left no executable behind.
  #[error("{target} export produced no executable at {}", path.display())]
  MissingExecutable { target: TargetKind, path: PathBuf },

  #[error("failed to write archive {}: {source}", path.display())]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("failed to walk {}: {source}", path.display())]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

impl PublishError {
  pub(crate) fn fs(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> PublishError + use<> {
    let path = path.to_path_buf();
    move |source| PublishError::Fs { op, path, source }
  }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Clean,
  Provision,
  NativeBuild,
  StageArtifacts,
  Export,
  Archive,
}

impl Stage {
  pub const ALL: [Stage; 6] = [
    Stage::Clean,
    Stage::Provision,
    Stage::NativeBuild,
    Stage::StageArtifacts,
    Stage::Export,
    Stage::Archive,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Stage::Clean => "clean",
      Stage::Provision => "provision",
      Stage::NativeBuild => "native build",
      Stage::StageArtifacts => "stage artifacts",
      Stage::Export => "export",
      Stage::Archive => "archive",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Options that change how the pipeline runs, not what it produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
  /// Run the release and debug exports concurrently and wait for both.
  pub parallel_exports: bool,
}

/// Record of one external tool run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStep {
  pub stage: Stage,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<TargetKind>,
  pub command: String,
  pub code: Option<i32>,
  pub success: bool,
}

impl ToolStep {
  pub fn new(stage: Stage, target: Option<TargetKind>, invocation: &Invocation, outcome: ProcessOutcome) -> Self {
    Self {
      stage,
      target,
      command: invocation.to_string(),
      code: outcome.code,
      success: outcome.success(),
    }
  }
}

/// What was written for one target's archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
  pub target: TargetKind,
  pub path: PathBuf,
  /// Number of file entries (directories excluded).
  pub files: usize,
  pub bytes: u64,
}

/// Result of a complete publish run.
#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
  /// Paths deleted during cleanup.
  pub removed: Vec<PathBuf>,
  /// File names of the staged shared libraries.
  pub staged: Vec<String>,
  /// Every tool run, in order.
  pub tools: Vec<ToolStep>,
  pub archives: Vec<ArchiveSummary>,
}

impl PublishReport {
  /// Tool runs that failed but were tolerated under the permissive policy.
  pub fn tolerated_failures(&self) -> impl Iterator<Item = &ToolStep> {
    self.tools.iter().filter(|step| !step.success)
  }

  pub fn is_success(&self) -> bool {
    self.tools.iter().all(|step| step.success)
  }
}

/// Receives progress notifications while the pipeline runs.
///
/// All methods default to doing nothing; `()` is the silent observer.
pub trait PublishObserver {
  fn stage_started(&mut self, _stage: Stage) {}

  fn archive_started(&mut self, _target: &BuildTarget) {}

  fn archive_written(&mut self, _summary: &ArchiveSummary) {}
}

impl PublishObserver for () {}
