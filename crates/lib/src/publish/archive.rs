//! Zip archives of the staged output directories.
//!
//! Entries are written in sorted order with the ZIP epoch as timestamp, so an
//! unchanged output directory always yields a byte-identical archive.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::{BuildTarget, Layout};
use crate::publish::types::{ArchiveSummary, PublishError, PublishObserver};

/// Archive both targets, release first.
pub fn archive<O: PublishObserver>(layout: &Layout, observer: &mut O) -> Result<Vec<ArchiveSummary>, PublishError> {
  let mut summaries = Vec::with_capacity(2);

  for target in layout.targets() {
    observer.archive_started(target);
    let summary = archive_target(target)?;
    observer.archive_written(&summary);
    summaries.push(summary);
  }

  Ok(summaries)
}

/// Zip the contents of `target.output_dir` into `target.archive_path`.
///
/// Entry names are relative to the output directory and use `/` separators.
/// An existing archive at the destination is overwritten.
pub fn archive_target(target: &BuildTarget) -> Result<ArchiveSummary, PublishError> {
  let src_dir = &target.output_dir;
  let dest = &target.archive_path;

  if let Some(parent) = dest.parent() {
    std::fs::create_dir_all(parent).map_err(PublishError::fs("create directory", parent))?;
  }

  let file = File::create(dest).map_err(PublishError::fs("create", dest))?;
  let mut zip = ZipWriter::new(BufWriter::new(file));
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .last_modified_time(DateTime::default());

  let mut files = 0;
  for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|source| PublishError::Walk {
      path: src_dir.clone(),
      source,
    })?;
    let name = entry_name(src_dir, entry.path())?;

    if entry.file_type().is_dir() {
      zip
        .add_directory(format!("{}/", name), options)
        .map_err(|source| PublishError::Archive {
          path: dest.clone(),
          source,
        })?;
      continue;
    }

    zip.start_file(name.as_str(), options).map_err(|source| PublishError::Archive {
      path: dest.clone(),
      source,
    })?;
    let mut input = File::open(entry.path()).map_err(PublishError::fs("open", entry.path()))?;
    io::copy(&mut input, &mut zip).map_err(PublishError::fs("write entry into", dest))?;

    debug!(entry = %name, "archived");
    files += 1;
  }

  let mut writer = zip.finish().map_err(|source| PublishError::Archive {
    path: dest.clone(),
    source,
  })?;
  io::Write::flush(&mut writer).map_err(PublishError::fs("flush", dest))?;
  drop(writer);

  let bytes = std::fs::metadata(dest).map_err(PublishError::fs("inspect", dest))?.len();

  info!(target = %target.kind, path = %dest.display(), files, bytes, "archive written");
  Ok(ArchiveSummary {
    target: target.kind,
    path: dest.clone(),
    files,
    bytes,
  })
}

fn entry_name(root: &Path, path: &Path) -> Result<String, PublishError> {
  let relative = path.strip_prefix(root).map_err(|_| PublishError::Fs {
    op: "relativize",
    path: path.to_path_buf(),
    source: io::Error::other(format!("not under {}", root.display())),
  })?;

  let parts: Vec<_> = relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect();
  Ok(parts.join("/"))
}
