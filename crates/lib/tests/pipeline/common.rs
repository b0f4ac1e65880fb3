//! Shared helpers for pipeline scenario tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use bitpub_lib::config::{FailurePolicy, Layout, PublishConfig};
use bitpub_lib::process::{Invocation, ProcessError, ProcessOutcome, ProcessRunner};
use tempfile::TempDir;

/// Isolated project tree: `godot/` and `rust/` folders under a temp root.
pub struct TestProject {
  pub temp: TempDir,
  pub layout: Layout,
}

impl TestProject {
  pub fn new(policy: FailurePolicy) -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    let config = PublishConfig {
      failure_policy: policy,
      ..PublishConfig::default()
    };
    let layout = Layout::new(&root, config).unwrap();
    std::fs::create_dir_all(layout.godot_dir()).unwrap();
    std::fs::create_dir_all(layout.native_dir()).unwrap();
    Self { temp, layout }
  }

  pub fn strict() -> Self {
    Self::new(FailurePolicy::Strict)
  }

  pub fn permissive() -> Self {
    Self::new(FailurePolicy::Permissive)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.layout.root.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.layout.root.join(relative_path)
  }
}

/// Sorted file names directly inside `dir`.
pub fn dir_listing(dir: &Path) -> Vec<String> {
  let mut names: Vec<_> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}

/// Entry names of a zip archive, in archive order.
pub fn zip_entries(path: &Path) -> Vec<String> {
  let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
  (0..archive.len())
    .map(|i| archive.by_index(i).unwrap().name().to_string())
    .collect()
}

/// Stand-in for cargo and Godot.
///
/// The native build drops `libraries` into the Godot folder, as the real
/// build's copy step does. Exports write a placeholder executable at their
/// output path unless `export_exit` is non-zero.
pub struct FakeTools {
  pub libraries: Vec<(String, String)>,
  pub native_exit: i32,
  pub export_exit: i32,
  pub calls: RefCell<Vec<Invocation>>,
}

impl FakeTools {
  pub fn new() -> Self {
    Self {
      libraries: Vec::new(),
      native_exit: 0,
      export_exit: 0,
      calls: RefCell::new(Vec::new()),
    }
  }

  pub fn with_library(mut self, name: &str, content: &str) -> Self {
    self.libraries.push((name.to_string(), content.to_string()));
    self
  }

  pub fn export_exit(mut self, code: i32) -> Self {
    self.export_exit = code;
    self
  }

  pub fn native_exit(mut self, code: i32) -> Self {
    self.native_exit = code;
    self
  }

  pub fn programs(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|i| i.program.clone()).collect()
  }
}

impl ProcessRunner for FakeTools {
  async fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome, ProcessError> {
    self.calls.borrow_mut().push(invocation.clone());

    match invocation.program.as_str() {
      "cargo" => {
        if self.native_exit != 0 {
          return Ok(ProcessOutcome {
            code: Some(self.native_exit),
          });
        }
        let godot_dir = invocation.cwd.join("..").join("godot");
        for (name, content) in &self.libraries {
          std::fs::write(godot_dir.join(name), content).unwrap();
        }
        Ok(ProcessOutcome { code: Some(0) })
      }
      "godot" => {
        if self.export_exit != 0 {
          return Ok(ProcessOutcome {
            code: Some(self.export_exit),
          });
        }
        let output = invocation.args.last().unwrap();
        std::fs::write(invocation.cwd.join(output), "fake exe").unwrap();
        Ok(ProcessOutcome { code: Some(0) })
      }
      other => panic!("unexpected program: {}", other),
    }
  }
}
