use bitpub_lib::publish::{PublishError, PublishOptions, clean, provision, publish};

use super::common::{FakeTools, TestProject, dir_listing, zip_entries};

#[tokio::test]
async fn clean_slate_publish() {
  let project = TestProject::strict();
  project.write_file("godot/a.dll", "aaa");
  project.write_file("godot/b.dll", "bbb");
  let tools = FakeTools::new();

  let report = publish(&project.layout, &tools, &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  assert_eq!(report.staged, vec!["a.dll", "b.dll"]);
  assert!(report.removed.is_empty());
  assert!(report.is_success());

  assert_eq!(
    dir_listing(&project.path("bin/Bitmapflow")),
    vec!["Bitmapflow.exe", "a.dll", "b.dll"]
  );
  assert_eq!(
    dir_listing(&project.path("bin/Bitmapflow_debug")),
    vec!["Bitmapflow_debug.exe", "a.dll", "b.dll"]
  );
  assert_eq!(
    zip_entries(&project.path("bin/Bitmapflow.zip")),
    vec!["Bitmapflow.exe", "a.dll", "b.dll"]
  );
  assert_eq!(
    zip_entries(&project.path("bin/Bitmapflow_debug.zip")),
    vec!["Bitmapflow_debug.exe", "a.dll", "b.dll"]
  );
}

#[tokio::test]
async fn libraries_from_native_build_are_staged() {
  let project = TestProject::strict();
  let tools = FakeTools::new().with_library("bitmapflow.dll", "native");

  let report = publish(&project.layout, &tools, &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  assert_eq!(report.staged, vec!["bitmapflow.dll"]);
  assert_eq!(tools.programs(), vec!["cargo", "godot", "godot"]);
  let staged = std::fs::read_to_string(project.path("bin/Bitmapflow_debug/bitmapflow.dll")).unwrap();
  assert_eq!(staged, "native");
}

#[tokio::test]
async fn stale_leftovers_do_not_survive() {
  let project = TestProject::strict();
  project.write_file("bin/Bitmapflow/old.txt", "stale");
  project.write_file("Bitmapflow/legacy.txt", "legacy");
  project.write_file("bin/Bitmapflow_debug.zip", "not a zip");

  clean(&project.layout).unwrap();
  provision(&project.layout).unwrap();

  assert!(project.path("bin/Bitmapflow").is_dir());
  assert!(dir_listing(&project.path("bin/Bitmapflow")).is_empty());
  assert!(!project.path("Bitmapflow").exists());
  assert!(!project.path("bin/Bitmapflow_debug.zip").exists());
}

#[tokio::test]
async fn stale_files_never_reach_the_archive() {
  let project = TestProject::strict();
  project.write_file("godot/a.dll", "aaa");
  project.write_file("bin/Bitmapflow/old.txt", "stale");

  let report = publish(&project.layout, &FakeTools::new(), &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  assert_eq!(report.removed, vec![project.path("bin/Bitmapflow")]);
  assert!(!zip_entries(&project.path("bin/Bitmapflow.zip")).contains(&"old.txt".to_string()));
}

#[tokio::test]
async fn publishing_twice_is_idempotent() {
  let project = TestProject::strict();
  project.write_file("godot/a.dll", "aaa");
  project.write_file("godot/b.dll", "bbb");

  publish(&project.layout, &FakeTools::new(), &PublishOptions::default(), &mut ())
    .await
    .unwrap();
  let first_listing = dir_listing(&project.path("bin/Bitmapflow_debug"));
  let first_zip = std::fs::read(project.path("bin/Bitmapflow.zip")).unwrap();

  let second = publish(&project.layout, &FakeTools::new(), &PublishOptions::default(), &mut ())
    .await
    .unwrap();
  let second_listing = dir_listing(&project.path("bin/Bitmapflow_debug"));
  let second_zip = std::fs::read(project.path("bin/Bitmapflow.zip")).unwrap();

  assert_eq!(first_listing, second_listing);
  assert_eq!(first_zip, second_zip);
  assert_eq!(second.removed.len(), 4, "both output dirs and both archives");
}

#[tokio::test]
async fn failed_export_is_swallowed_in_permissive_mode() {
  let project = TestProject::permissive();
  project.write_file("godot/a.dll", "aaa");
  let tools = FakeTools::new().export_exit(1);

  let report = publish(&project.layout, &tools, &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  assert!(!report.is_success());
  assert_eq!(report.tolerated_failures().count(), 2);
  assert_eq!(zip_entries(&project.path("bin/Bitmapflow.zip")), vec!["a.dll"]);
  assert_eq!(zip_entries(&project.path("bin/Bitmapflow_debug.zip")), vec!["a.dll"]);
}

#[tokio::test]
async fn failed_native_build_is_swallowed_in_permissive_mode() {
  let project = TestProject::permissive();
  let tools = FakeTools::new().native_exit(101);

  let report = publish(&project.layout, &tools, &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  assert_eq!(report.tolerated_failures().count(), 1);
  assert_eq!(tools.programs(), vec!["cargo", "godot", "godot"]);
  assert!(project.path("bin/Bitmapflow.zip").is_file());
}

#[tokio::test]
async fn failed_export_aborts_in_strict_mode() {
  let project = TestProject::strict();
  project.write_file("godot/a.dll", "aaa");
  let tools = FakeTools::new().export_exit(1);

  let result = publish(&project.layout, &tools, &PublishOptions::default(), &mut ()).await;

  assert!(matches!(result, Err(PublishError::ExportFailed { .. })));
  assert!(!project.path("bin/Bitmapflow.zip").exists());
  assert!(!project.path("bin/Bitmapflow_debug.zip").exists());
}

#[tokio::test]
async fn parallel_exports_match_sequential_outputs() {
  let sequential = TestProject::strict();
  sequential.write_file("godot/a.dll", "aaa");
  publish(&sequential.layout, &FakeTools::new(), &PublishOptions::default(), &mut ())
    .await
    .unwrap();

  let parallel = TestProject::strict();
  parallel.write_file("godot/a.dll", "aaa");
  let options = PublishOptions { parallel_exports: true };
  publish(&parallel.layout, &FakeTools::new(), &options, &mut ())
    .await
    .unwrap();

  for name in ["bin/Bitmapflow.zip", "bin/Bitmapflow_debug.zip"] {
    assert_eq!(
      std::fs::read(sequential.path(name)).unwrap(),
      std::fs::read(parallel.path(name)).unwrap()
    );
  }
}
