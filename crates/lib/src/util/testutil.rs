//! Test utilities for bitpub-lib.
//!
//! Cross-platform helpers for tests that need to execute real child
//! processes.

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Returns the command and args to write an environment variable's value to a file.
///
/// Since environment variable expansion requires a shell, this goes through one.
#[cfg(unix)]
pub fn write_env_to_file(var: &str, filename: &str) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo \"${}\" > {}", var, filename))
}

#[cfg(windows)]
pub fn write_env_to_file(var: &str, filename: &str) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo %{}%> {}", var, filename))
}

/// In-process stand-in for cargo and Godot.
///
/// Records every invocation. Export invocations (`--export`, `--export-debug`)
/// write a placeholder executable at their output path, resolved against the
/// invocation's working directory, unless outputs are skipped.
#[derive(Debug, Default)]
pub struct FakeRunner {
  calls: std::cell::RefCell<Vec<crate::process::Invocation>>,
  exit_codes: std::collections::HashMap<String, i32>,
  missing: std::collections::HashSet<String>,
  skip_outputs: bool,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every run of `program` exit with `code`, producing no output.
  pub fn fail_program(mut self, program: &str, code: i32) -> Self {
    self.exit_codes.insert(program.to_string(), code);
    self
  }

  /// Make `program` fail to launch.
  pub fn missing_program(mut self, program: &str) -> Self {
    self.missing.insert(program.to_string());
    self
  }

  /// Exports succeed without writing an executable.
  pub fn skip_outputs(mut self) -> Self {
    self.skip_outputs = true;
    self
  }

  pub fn invocations(&self) -> Vec<crate::process::Invocation> {
    self.calls.borrow().clone()
  }
}

impl crate::process::ProcessRunner for FakeRunner {
  async fn run(
    &self,
    invocation: &crate::process::Invocation,
  ) -> Result<crate::process::ProcessOutcome, crate::process::ProcessError> {
    use crate::process::{ProcessError, ProcessOutcome};

    self.calls.borrow_mut().push(invocation.clone());

    if self.missing.contains(&invocation.program) {
      return Err(ProcessError::Launch {
        program: invocation.program.clone(),
        cwd: invocation.cwd.clone(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
      });
    }

    if let Some(&code) = self.exit_codes.get(&invocation.program) {
      return Ok(ProcessOutcome { code: Some(code) });
    }

    let is_export = invocation
      .args
      .iter()
      .any(|a| a == "--export" || a == "--export-debug");
    if is_export
      && !self.skip_outputs
      && let Some(output) = invocation.args.last()
    {
      std::fs::write(invocation.cwd.join(output), b"MZ fake executable").map_err(|source| ProcessError::Launch {
        program: invocation.program.clone(),
        cwd: invocation.cwd.clone(),
        source,
      })?;
    }

    Ok(ProcessOutcome { code: Some(0) })
  }
}
