//! End-to-end manifest and lockfile behavior of `add` and `remove`,
//! driven through the library (path dependencies only, no network).

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hoist::core::{Shell, Workspace};
use hoist::ops::{self, AddOptions, DepOp, RemoveOptions};
use hoist::util::toml_mut::manifest::DepTable;
use hoist::util::Config;

/// A shell sink the test can read back after `Config` takes ownership.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn test_config(cwd: &Path) -> Config {
    Config::new(
        Shell::from_write(Box::new(Vec::<u8>::new())),
        cwd.to_path_buf(),
        cwd.join(".hoist"),
    )
}

fn write_package(dir: &Path, name: &str, version: &str) -> std::path::PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let manifest = dir.join("Hoist.toml");
    std::fs::write(
        &manifest,
        format!("[package]\nname = \"{name}\"\nversion = \"{version}\"\n"),
    )
    .unwrap();
    manifest
}

#[test]
fn add_path_dependency_updates_manifest_and_lockfile() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");
    write_package(&root.join("mylib"), "mylib", "0.5.0");

    let config = test_config(root);
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let options = AddOptions {
        deps: vec![DepOp {
            spec: "mylib".to_string(),
            path: Some("mylib".to_string()),
            ..Default::default()
        }],
        section: DepTable::default(),
        dry_run: false,
        reg_or_index: None,
    };
    ops::add(&ws, package, &options).unwrap();

    let manifest_out = std::fs::read_to_string(&manifest).unwrap();
    assert!(manifest_out.contains("[dependencies]"));
    assert!(manifest_out.contains("mylib"));
    assert!(manifest_out.contains("path = \"mylib\""));

    let lock = std::fs::read_to_string(root.join("Hoist.lock")).unwrap();
    assert!(lock.contains("name = \"mylib\""));
    assert!(lock.contains("version = \"0.5.0\""));
    assert!(lock.contains("path+file://"));
    assert!(lock.contains("dependencies = [\"mylib\"]"));
}

#[test]
fn add_dry_run_leaves_everything_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");
    write_package(&root.join("mylib"), "mylib", "0.5.0");

    let config = test_config(root);
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let options = AddOptions {
        deps: vec![DepOp {
            spec: "mylib".to_string(),
            path: Some("mylib".to_string()),
            ..Default::default()
        }],
        section: DepTable::default(),
        dry_run: true,
        reg_or_index: None,
    };
    ops::add(&ws, package, &options).unwrap();

    let manifest_out = std::fs::read_to_string(&manifest).unwrap();
    assert!(!manifest_out.contains("mylib"));
    assert!(!root.join("Hoist.lock").exists());
}

#[test]
fn remove_prunes_unreachable_lockfile_entries() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");
    write_package(&root.join("mylib"), "mylib", "0.5.0");

    let config = test_config(root);
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let add_options = AddOptions {
        deps: vec![DepOp {
            spec: "mylib".to_string(),
            path: Some("mylib".to_string()),
            ..Default::default()
        }],
        section: DepTable::default(),
        dry_run: false,
        reg_or_index: None,
    };
    ops::add(&ws, package, &add_options).unwrap();

    // Reload so the removal sees the updated manifest.
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();
    let remove_options = RemoveOptions {
        deps: vec!["mylib".to_string()],
        section: DepTable::default(),
        dry_run: false,
    };
    ops::remove(&ws, package, &remove_options).unwrap();

    let manifest_out = std::fs::read_to_string(&manifest).unwrap();
    assert!(!manifest_out.contains("mylib"));
    assert!(!manifest_out.contains("[dependencies]"));

    let lock = std::fs::read_to_string(root.join("Hoist.lock")).unwrap();
    assert!(lock.contains("name = \"demo\""));
    assert!(!lock.contains("mylib"));
}

#[test]
fn renamed_dependency_survives_removing_another() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");
    write_package(&root.join("mylib"), "mylib", "0.5.0");
    write_package(&root.join("otherlib"), "otherlib", "1.2.0");

    let config = test_config(root);
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let add_options = AddOptions {
        deps: vec![
            DepOp {
                spec: "mylib".to_string(),
                rename: Some("alias".to_string()),
                path: Some("mylib".to_string()),
                ..Default::default()
            },
            DepOp {
                spec: "otherlib".to_string(),
                path: Some("otherlib".to_string()),
                ..Default::default()
            },
        ],
        section: DepTable::default(),
        dry_run: false,
        reg_or_index: None,
    };
    ops::add(&ws, package, &add_options).unwrap();

    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();
    let remove_options = RemoveOptions {
        deps: vec!["otherlib".to_string()],
        section: DepTable::default(),
        dry_run: false,
    };
    ops::remove(&ws, package, &remove_options).unwrap();

    // The dep declared under `alias = { package = "mylib" }` is still in the
    // manifest, so its lockfile entry must survive the unrelated removal.
    let manifest_out = std::fs::read_to_string(&manifest).unwrap();
    assert!(manifest_out.contains("package = \"mylib\""));

    let lock = std::fs::read_to_string(root.join("Hoist.lock")).unwrap();
    assert!(lock.contains("name = \"mylib\""));
    assert!(lock.contains("dependencies = [\"mylib\"]"));
    assert!(!lock.contains("otherlib"));
}

#[test]
fn add_prints_enabled_features() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");
    write_package(&root.join("mylib"), "mylib", "0.5.0");

    let buf = SharedBuf::default();
    let mut config = Config::new(
        Shell::from_write(Box::new(buf.clone())),
        root.to_path_buf(),
        root.join(".hoist"),
    );
    config.configure(0, false, None, false, false, false).unwrap();
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let options = AddOptions {
        deps: vec![DepOp {
            spec: "mylib".to_string(),
            path: Some("mylib".to_string()),
            features: Some(["extra".to_string()].into_iter().collect()),
            ..Default::default()
        }],
        section: DepTable::default(),
        dry_run: false,
        reg_or_index: None,
    };
    ops::add(&ws, package, &options).unwrap();

    // Feature lists show at normal verbosity, not just under `-v`.
    let out = buf.contents();
    assert!(out.contains("Features"));
    assert!(out.contains("+ extra"));
}

#[test]
fn removing_a_missing_dependency_fails() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let manifest = write_package(root, "demo", "0.1.0");

    let config = test_config(root);
    let ws = Workspace::new(&manifest, &config).unwrap();
    let package = ws.current().unwrap();

    let options = RemoveOptions {
        deps: vec!["serde".to_string()],
        section: DepTable::default(),
        dry_run: false,
    };
    let err = ops::remove(&ws, package, &options).unwrap_err();
    assert!(err.to_string().contains("`serde`"));
}
