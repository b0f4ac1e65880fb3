use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding normal component where there is one.
pub fn normalize(path: &Path) -> PathBuf {
  let mut parts: Vec<Component<'_>> = Vec::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match parts.last() {
        Some(Component::Normal(_)) => {
          parts.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => parts.push(component),
      },
      other => parts.push(other),
    }
  }

  parts.iter().collect()
}

/// Express `path` relative to `base`, walking up with `..` where needed.
///
/// Both paths are normalized first. When no relative form exists (different
/// prefixes, or `base` still climbs out of its own root after normalizing),
/// `path` is returned unchanged.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
  let path_norm = normalize(path);
  let base_norm = normalize(base);

  let path_parts: Vec<_> = path_norm.components().collect();
  let base_parts: Vec<_> = base_norm.components().collect();

  let common = path_parts
    .iter()
    .zip(base_parts.iter())
    .take_while(|(a, b)| a == b)
    .count();

  let rooted = has_root(&path_parts);
  if rooted != has_root(&base_parts) || (rooted && common == 0) {
    return path.to_path_buf();
  }

  let base_rest = &base_parts[common..];
  if base_rest.iter().any(|c| !matches!(c, Component::Normal(_))) {
    return path.to_path_buf();
  }

  let mut relative = PathBuf::new();
  for _ in base_rest {
    relative.push("..");
  }
  for component in &path_parts[common..] {
    relative.push(component.as_os_str());
  }

  if relative.as_os_str().is_empty() {
    relative.push(".");
  }

  relative
}

/// Render a relative path with `/` separators on every platform.
///
/// Rooted paths keep their native form.
pub fn to_slash(path: &Path) -> String {
  let parts: Vec<_> = path.components().collect();
  if has_root(&parts) {
    return path.to_string_lossy().into_owned();
  }

  parts
    .iter()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

fn has_root(parts: &[Component<'_>]) -> bool {
  parts
    .iter()
    .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}
