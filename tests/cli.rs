//! Smoke tests for the `hoist` binary itself: version output, command
//! listing, typo suggestions, and manifest discovery errors.

use std::path::Path;

use snapbox::cmd::{cargo_bin, Command};

fn hoist(dir: &Path) -> Command {
    Command::new(cargo_bin("hoist"))
        .env("HOIST_HOME", dir.join(".hoist"))
        .current_dir(dir)
}

#[test]
fn version() {
    let dir = tempfile::tempdir().unwrap();
    hoist(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout_eq(format!("hoist {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_names_every_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let assert = hoist(dir.path()).arg("--list").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.starts_with("Installed Commands:"));
    for name in [
        "add",
        "bench",
        "clean",
        "fetch",
        "info",
        "login",
        "logout",
        "owner",
        "pkgid",
        "publish",
        "remove",
        "rustdoc",
        "search",
        "test",
        "uninstall",
    ] {
        assert!(output.contains(name), "`{name}` missing from --list");
    }
}

#[test]
fn unknown_command_suggests_the_closest_builtin() {
    let dir = tempfile::tempdir().unwrap();
    hoist(dir.path())
        .arg("serach")
        .assert()
        .code(101)
        .stderr_eq(
            "error: no such command: `serach`\n\n\
             \tDid you mean `search`?\n\n\
             \tView all installed commands with `hoist --list`\n",
        );
}

#[test]
fn builtin_shorthand_expands() {
    // `rm` expands to `remove`, which then fails to find a manifest.
    let dir = tempfile::tempdir().unwrap();
    let assert = hoist(dir.path()).args(["rm", "serde"]).assert().code(101);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("could not find `Hoist.toml`"));
}

#[test]
fn commands_need_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let assert = hoist(dir.path()).arg("fetch").assert().code(101);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("could not find `Hoist.toml`"));
}

#[test]
fn pkgid_requires_a_lockfile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Hoist.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();

    let assert = hoist(dir.path()).arg("pkgid").assert().code(101);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("`Hoist.lock` must exist"));
}

#[test]
fn add_then_pkgid_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Hoist.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("mylib")).unwrap();
    std::fs::write(
        dir.path().join("mylib/Hoist.toml"),
        "[package]\nname = \"mylib\"\nversion = \"0.5.0\"\n",
    )
    .unwrap();

    let run = |args: &[&str]| hoist(dir.path()).args(args).assert();

    run(&["add", "mylib", "--path", "mylib"]).success();
    assert!(dir.path().join("Hoist.lock").exists());

    let assert = run(&["pkgid", "mylib"]).success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("mylib@0.5.0"));
}
