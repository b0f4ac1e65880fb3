//! Cleanup and provisioning of output directories.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Layout;
use crate::publish::types::PublishError;

/// Remove output directories, legacy folders and prior archives.
///
/// Absent paths are skipped. A plain file sitting where a directory is
/// expected is removed as well. Returns the paths that were actually removed.
pub fn clean(layout: &Layout) -> Result<Vec<PathBuf>, PublishError> {
  let mut removed = Vec::new();

  for path in layout.clean_paths() {
    if remove_path(&path)? {
      debug!(path = %path.display(), "removed");
      removed.push(path);
    }
  }

  info!(count = removed.len(), "cleanup complete");
  Ok(removed)
}

/// Create both output directories, including missing parents.
pub fn provision(layout: &Layout) -> Result<(), PublishError> {
  for target in layout.targets() {
    std::fs::create_dir_all(&target.output_dir).map_err(PublishError::fs("create directory", &target.output_dir))?;
    debug!(path = %target.output_dir.display(), "provisioned output directory");
  }
  Ok(())
}

fn remove_path(path: &Path) -> Result<bool, PublishError> {
  let metadata = match std::fs::symlink_metadata(path) {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(PublishError::fs("inspect", path)(e)),
  };

  if metadata.is_dir() {
    std::fs::remove_dir_all(path).map_err(PublishError::fs("remove directory", path))?;
  } else {
    std::fs::remove_file(path).map_err(PublishError::fs("remove file", path))?;
  }

  Ok(true)
}
