//! Staging of shared-library artifacts into the output directories.

use std::io;

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Layout};
use crate::publish::types::PublishError;

/// Copy every file in the source directory matching the library pattern into
/// both output directories.
///
/// File names are preserved and existing files overwritten. Hidden files only
/// match a pattern that spells out the leading dot, and matching is
/// case-insensitive on Windows. A missing source directory stages nothing.
///
/// Returns the staged file names, sorted.
pub fn stage_artifacts(layout: &Layout) -> Result<Vec<String>, PublishError> {
  let source_dir = layout.source_dll_dir();
  let pattern_str = &layout.config.library_pattern;
  let pattern = Pattern::new(pattern_str)
    .map_err(|e| ConfigError::Invalid(format!("library_pattern '{}': {}", pattern_str, e)))?;

  let options = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: true,
    require_literal_leading_dot: true,
  };

  let entries = match std::fs::read_dir(&source_dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      warn!(dir = %source_dir.display(), "library source directory does not exist, nothing staged");
      return Ok(Vec::new());
    }
    Err(e) => return Err(PublishError::fs("read directory", &source_dir)(e)),
  };

  let mut libraries = Vec::new();
  for entry in entries {
    let entry = entry.map_err(PublishError::fs("read directory", &source_dir))?;
    let file_type = entry.file_type().map_err(PublishError::fs("inspect", &entry.path()))?;

    // Symlinks are followed so a linked library is staged as a regular file.
    let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
    if !is_file {
      continue;
    }

    let name = entry.file_name().to_string_lossy().into_owned();
    if pattern.matches_with(&name, options) {
      libraries.push(name);
    }
  }
  libraries.sort();

  for name in &libraries {
    let src = source_dir.join(name);
    for target in layout.targets() {
      let dest = target.output_dir.join(name);
      std::fs::copy(&src, &dest).map_err(PublishError::fs("copy to", &dest))?;
    }
    debug!(library = %name, "staged");
  }

  info!(count = libraries.len(), pattern = %pattern_str, "staged shared libraries");
  Ok(libraries)
}
