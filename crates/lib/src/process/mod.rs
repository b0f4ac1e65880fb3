//! External process invocation.
//!
//! The publisher never changes its own working directory. Every tool run is
//! described by an [`Invocation`] that carries its working directory and
//! environment overrides, and is executed through a [`ProcessRunner`] so the
//! pipeline can be driven by fake tools in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors raised while starting or waiting on a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started (missing binary, missing working directory, ...).
  #[error("failed to launch '{program}' in {}: {source}", cwd.display())]
  Launch {
    program: String,
    cwd: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A single external command: program, arguments, working directory and
/// environment overrides merged into the inherited environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, quote(value))?;
    }
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(s: &str) -> String {
  if s.is_empty() || s.contains(char::is_whitespace) {
    format!("\"{}\"", s)
  } else {
    s.to_string()
  }
}

/// How a child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
  /// Exit code, `None` when the process was killed by a signal.
  pub code: Option<i32>,
}

impl ProcessOutcome {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs invocations to completion.
pub trait ProcessRunner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<ProcessOutcome, ProcessError>>;
}

/// Where a child's standard output goes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChildStdout {
  /// Shared with the publisher's own stdout.
  #[default]
  Inherit,
  /// Sent to the publisher's stderr, leaving stdout for machine-readable output.
  Stderr,
}

/// Runs invocations as real child processes.
///
/// Stdin and stderr are inherited, so compiler and engine output goes straight
/// to the console. Stdout follows [`ChildStdout`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner {
  pub stdout: ChildStdout,
}

impl SystemRunner {
  pub fn new(stdout: ChildStdout) -> Self {
    Self { stdout }
  }
}

impl ProcessRunner for SystemRunner {
  async fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome, ProcessError> {
    info!(cmd = %invocation, "running command");

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).current_dir(&invocation.cwd);

    if self.stdout == ChildStdout::Stderr {
      command.stdout(std::io::stderr());
    }

    for (key, value) in &invocation.env {
      command.env(key, value);
    }

    debug!(program = %invocation.program, working_dir = ?invocation.cwd, "spawning process");

    let status = command.status().await.map_err(|source| ProcessError::Launch {
      program: invocation.program.clone(),
      cwd: invocation.cwd.clone(),
      source,
    })?;

    let outcome = ProcessOutcome { code: status.code() };
    debug!(program = %invocation.program, code = ?outcome.code, "process exited");

    Ok(outcome)
  }
}
