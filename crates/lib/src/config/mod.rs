//! Publisher configuration.
//!
//! Every path and name the pipeline touches lives in [`PublishConfig`]. The
//! defaults reproduce the layout of the Bitmapflow repository; a `bitpub.toml`
//! in the project root can override any of them, and the tool binaries can
//! additionally be overridden from the environment.
//!
//! Relative paths are always resolved against the project root handed to
//! [`Layout::new`], never against the process's current directory.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{CARGO_BIN_ENV, CONFIG_FILENAME, GODOT_BIN_ENV};
use crate::util::paths::normalize;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid config: {0}")]
  Invalid(String),
}

/// How the pipeline reacts when an external tool exits unsuccessfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
  /// Abort the run with a typed error.
  #[default]
  Strict,
  /// Record the failure in the report and keep going. Archives are still produced.
  Permissive,
}

impl FailurePolicy {
  pub fn is_strict(self) -> bool {
    matches!(self, FailurePolicy::Strict)
  }
}

/// Publisher settings, as read from `bitpub.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
  /// Name of the release target (output directory, archive and executable).
  pub release_name: String,
  /// Name of the debug target.
  pub debug_name: String,
  /// Directory that receives the staged output directories and archives.
  pub output_root: PathBuf,
  /// Directory the shared libraries are collected from.
  pub source_dll_dir: PathBuf,
  /// Working directory for Godot (the Godot project folder).
  pub godot_working_dir: PathBuf,
  /// Working directory for the native build (the cargo project folder).
  pub native_working_dir: PathBuf,
  /// Glob matched against file names in `source_dll_dir`.
  pub library_pattern: String,
  /// Godot export preset used for both targets.
  pub export_preset: String,
  pub godot_bin: String,
  pub cargo_bin: String,
  pub failure_policy: FailurePolicy,
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      release_name: "Bitmapflow".to_string(),
      debug_name: "Bitmapflow_debug".to_string(),
      output_root: PathBuf::from("bin"),
      source_dll_dir: PathBuf::from("godot"),
      godot_working_dir: PathBuf::from("godot"),
      native_working_dir: PathBuf::from("rust"),
      library_pattern: "*.dll".to_string(),
      export_preset: "Windows Desktop".to_string(),
      godot_bin: "godot".to_string(),
      cargo_bin: "cargo".to_string(),
      failure_policy: FailurePolicy::Strict,
    }
  }
}

impl PublishConfig {
  /// Load configuration for the project at `root`.
  ///
  /// With `file` set, that file must exist. Without it, `bitpub.toml` in the
  /// project root is used when present and defaults otherwise. Environment
  /// overrides for the tool binaries are applied last.
  pub fn load(root: &Path, file: Option<&Path>) -> Result<Self, ConfigError> {
    let mut config = match file {
      Some(path) => Self::from_file(path)?,
      None => {
        let default_path = root.join(CONFIG_FILENAME);
        if default_path.is_file() {
          Self::from_file(&default_path)?
        } else {
          debug!(root = %root.display(), "no config file, using defaults");
          Self::default()
        }
      }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
  }

  /// Replace the tool binaries with `BITPUB_GODOT` / `BITPUB_CARGO` when set.
  pub fn apply_env_overrides(&mut self) {
    if let Some(godot) = non_empty_env(GODOT_BIN_ENV) {
      debug!(godot = %godot, "godot binary overridden from environment");
      self.godot_bin = godot;
    }
    if let Some(cargo) = non_empty_env(CARGO_BIN_ENV) {
      debug!(cargo = %cargo, "cargo binary overridden from environment");
      self.cargo_bin = cargo;
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_name("release_name", &self.release_name)?;
    validate_name("debug_name", &self.debug_name)?;

    if self.release_name == self.debug_name {
      return Err(ConfigError::Invalid(format!(
        "release_name and debug_name must differ (both are '{}')",
        self.release_name
      )));
    }

    if self.library_pattern.trim().is_empty() {
      return Err(ConfigError::Invalid("library_pattern must not be empty".to_string()));
    }
    glob::Pattern::new(&self.library_pattern)
      .map_err(|e| ConfigError::Invalid(format!("library_pattern '{}': {}", self.library_pattern, e)))?;

    if self.godot_bin.is_empty() || self.cargo_bin.is_empty() {
      return Err(ConfigError::Invalid("tool binaries must not be empty".to_string()));
    }

    Ok(())
  }
}

fn validate_name(field: &str, name: &str) -> Result<(), ConfigError> {
  if name.is_empty() {
    return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
  }
  if name == "." || name == ".." || name.contains(['/', '\\']) {
    return Err(ConfigError::Invalid(format!(
      "{} must be a plain file name, got '{}'",
      field, name
    )));
  }
  Ok(())
}

fn non_empty_env(var: &str) -> Option<String> {
  std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Which of the two distributables a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
  Release,
  Debug,
}

impl TargetKind {
  pub fn as_str(self) -> &'static str {
    match self {
      TargetKind::Release => "release",
      TargetKind::Debug => "debug",
    }
  }

  /// Godot flag selecting this export variant.
  pub fn export_flag(self) -> &'static str {
    match self {
      TargetKind::Release => "--export",
      TargetKind::Debug => "--export-debug",
    }
  }
}

impl std::fmt::Display for TargetKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One distributable: its staging directory, archive and executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  pub kind: TargetKind,
  pub name: String,
  pub output_dir: PathBuf,
  pub archive_path: PathBuf,
  pub executable_name: String,
}

impl BuildTarget {
  fn new(kind: TargetKind, name: &str, output_root: &Path) -> Self {
    Self {
      kind,
      name: name.to_string(),
      output_dir: output_root.join(name),
      archive_path: output_root.join(format!("{}.zip", name)),
      executable_name: format!("{}.exe", name),
    }
  }

  pub fn export_flag(&self) -> &'static str {
    self.kind.export_flag()
  }

  pub fn executable_path(&self) -> PathBuf {
    self.output_dir.join(&self.executable_name)
  }
}

/// A validated configuration resolved against a project root.
#[derive(Debug, Clone)]
pub struct Layout {
  pub root: PathBuf,
  pub config: PublishConfig,
  pub release: BuildTarget,
  pub debug: BuildTarget,
}

impl Layout {
  pub fn new(root: &Path, config: PublishConfig) -> Result<Self, ConfigError> {
    config.validate()?;

    let root = root.to_path_buf();
    let output_root = root.join(&config.output_root);
    let release = BuildTarget::new(TargetKind::Release, &config.release_name, &output_root);
    let debug = BuildTarget::new(TargetKind::Debug, &config.debug_name, &output_root);

    let layout = Self {
      root,
      config,
      release,
      debug,
    };
    layout.check_ownership()?;
    Ok(layout)
  }

  /// Cleanup deletes recursively, so none of its paths may reach a folder the
  /// publisher does not own, and no archive may sit on a staging folder.
  fn check_ownership(&self) -> Result<(), ConfigError> {
    let protected = [
      ("the project root", self.root.clone()),
      ("output_root", self.output_root()),
      ("source_dll_dir", self.source_dll_dir()),
      ("godot_working_dir", self.godot_dir()),
      ("native_working_dir", self.native_dir()),
    ];

    for path in self.clean_paths() {
      let path = normalize(&path);
      if let Some((field, _)) = protected.iter().find(|(_, dir)| normalize(dir).starts_with(&path)) {
        return Err(ConfigError::Invalid(format!(
          "cleaning {} would delete {}",
          path.display(),
          field
        )));
      }
    }

    let [legacy_release, legacy_debug] = self.legacy_dirs();
    let dirs = [
      &self.release.output_dir,
      &self.debug.output_dir,
      &legacy_release,
      &legacy_debug,
    ]
    .map(|dir| normalize(dir));
    for target in self.targets() {
      let archive = normalize(&target.archive_path);
      if let Some(dir) = dirs.iter().find(|dir| archive.starts_with(dir) || dir.starts_with(&archive)) {
        return Err(ConfigError::Invalid(format!(
          "{} archive {} collides with folder {}",
          target.kind,
          archive.display(),
          dir.display()
        )));
      }
    }

    Ok(())
  }

  /// Both targets, release first.
  pub fn targets(&self) -> [&BuildTarget; 2] {
    [&self.release, &self.debug]
  }

  pub fn output_root(&self) -> PathBuf {
    self.root.join(&self.config.output_root)
  }

  pub fn source_dll_dir(&self) -> PathBuf {
    self.root.join(&self.config.source_dll_dir)
  }

  pub fn godot_dir(&self) -> PathBuf {
    self.root.join(&self.config.godot_working_dir)
  }

  pub fn native_dir(&self) -> PathBuf {
    self.root.join(&self.config.native_working_dir)
  }

  /// Top-level folders named after the targets, left behind by older runs.
  pub fn legacy_dirs(&self) -> [PathBuf; 2] {
    [self.root.join(&self.release.name), self.root.join(&self.debug.name)]
  }

  /// Every path cleanup removes: output directories, legacy folders, archives.
  pub fn clean_paths(&self) -> Vec<PathBuf> {
    let [legacy_release, legacy_debug] = self.legacy_dirs();
    vec![
      self.release.output_dir.clone(),
      legacy_release,
      self.debug.output_dir.clone(),
      legacy_debug,
      self.release.archive_path.clone(),
      self.debug.archive_path.clone(),
    ]
  }
}
