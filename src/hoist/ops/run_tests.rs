//! Runs the `[[test]]` and `[[bench]]` harnesses declared in the manifest.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::bail;

use crate::core::manifest::TomlHarness;
use crate::core::{Package, Workspace};
use crate::util::errors::VerboseError;
use crate::util::process_builder::{ProcessBuilder, ProcessError};
use crate::util::HoistResult;

#[derive(Debug, Default)]
pub struct TestOptions {
    /// Number of harnesses to run in parallel. Defaults to 1.
    pub jobs: Option<u32>,
    /// Keep running remaining harnesses after a failure.
    pub no_fail_fast: bool,
    /// Only run harnesses whose name contains this string.
    pub filter: Option<String>,
    /// Extra arguments passed through to every harness (after `--`).
    pub extra_args: Vec<String>,
}

/// A failed harness, carrying its exit code so the CLI can propagate it.
#[derive(Debug, thiserror::Error)]
#[error("{kind} harness `{name}` failed")]
pub struct HarnessError {
    name: String,
    kind: String,
    code: Option<i32>,
    #[source]
    detail: VerboseError,
}

impl HarnessError {
    /// The exit code of the failed harness process, if it exited with one.
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

/// Runs the package's test harnesses.
pub fn run_tests(ws: &Workspace<'_>, package: &Package, opts: &TestOptions) -> HoistResult<()> {
    run_harnesses(ws, package, package.test_harnesses(), opts, "test")
}

/// Runs the package's bench harnesses.
pub fn run_benches(ws: &Workspace<'_>, package: &Package, opts: &TestOptions) -> HoistResult<()> {
    run_harnesses(ws, package, package.bench_harnesses(), opts, "bench")
}

fn run_harnesses(
    ws: &Workspace<'_>,
    package: &Package,
    harnesses: &[TomlHarness],
    opts: &TestOptions,
    kind: &str,
) -> HoistResult<()> {
    let config = ws.config();

    let selected: Vec<&TomlHarness> = harnesses
        .iter()
        .filter(|h| match &opts.filter {
            Some(filter) => h.name.contains(filter.as_str()),
            None => true,
        })
        .collect();

    if selected.is_empty() {
        match &opts.filter {
            Some(filter) => bail!(
                "no {kind} harness named `{filter}` in `{}`",
                package.name()?
            ),
            None => {
                config
                    .shell()
                    .warn(format!("no `[[{kind}]]` harnesses declared, nothing to run"))?;
                return Ok(());
            }
        }
    }

    let processes: Vec<(String, ProcessBuilder)> = selected
        .iter()
        .map(|harness| {
            let mut process = ProcessBuilder::new(&harness.command);
            process
                .args(&harness.args)
                .args(&opts.extra_args)
                .cwd(package.root())
                .env("HOIST_MANIFEST_PATH", package.manifest_path());
            if let Ok(exe) = std::env::current_exe() {
                process.env(crate::HOIST_ENV, exe);
            }
            (harness.name.clone(), process)
        })
        .collect();

    for (name, process) in &processes {
        config.shell().status("Running", format!("{kind} `{name}`"))?;
        config
            .shell()
            .verbose(|shell| shell.status("Executing", process))?;
    }

    let jobs = opts.jobs.unwrap_or(1).max(1) as usize;
    let failures = execute(&processes, jobs, opts.no_fail_fast);

    match failures.len() {
        0 => Ok(()),
        1 => {
            let (name, error) = failures.into_iter().next().expect("one failure");
            let code = error.downcast_ref::<ProcessError>().and_then(|e| e.code);
            // The harness already printed its own output, so the process-exit
            // detail is only worth showing under `-v`.
            Err(HarnessError {
                name,
                kind: kind.to_string(),
                code,
                detail: VerboseError::new(error),
            }
            .into())
        }
        n => {
            for (name, error) in &failures {
                config
                    .shell()
                    .error(format!("{kind} harness `{name}` failed: {error:#}"))?;
            }
            bail!("{n} {kind} harnesses failed")
        }
    }
}

/// Runs the processes on up to `jobs` worker threads. On failure no new
/// work is started unless `no_fail_fast` is set; running harnesses always
/// finish.
fn execute(
    processes: &[(String, ProcessBuilder)],
    jobs: usize,
    no_fail_fast: bool,
) -> Vec<(String, anyhow::Error)> {
    let queue: Mutex<VecDeque<&(String, ProcessBuilder)>> =
        Mutex::new(processes.iter().collect());
    let failed = AtomicBool::new(false);
    let failures: Mutex<Vec<(String, anyhow::Error)>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for _ in 0..jobs.min(processes.len()) {
            scope.spawn(|| loop {
                if failed.load(Ordering::SeqCst) && !no_fail_fast {
                    break;
                }
                let next = queue.lock().expect("queue poisoned").pop_front();
                let Some((name, process)) = next else {
                    break;
                };
                if let Err(error) = process.exec() {
                    failed.store(true, Ordering::SeqCst);
                    failures
                        .lock()
                        .expect("failures poisoned")
                        .push((name.clone(), error));
                }
            });
        }
    });

    let mut failures = failures.into_inner().expect("failures poisoned");
    failures.sort_by(|a, b| a.0.cmp(&b.0));
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Shell;
    use crate::util::Config;

    fn test_ws(dir: &std::path::Path, manifest: &str) -> std::path::PathBuf {
        let path = dir.join("Hoist.toml");
        std::fs::write(&path, manifest).unwrap();
        path
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            dir.to_path_buf(),
            dir.join(".hoist"),
        )
    }

    #[cfg(unix)]
    #[test]
    fn runs_declared_harnesses() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_ws(
            dir.path(),
            r#"[package]
name = "demo"
version = "0.1.0"

[[test]]
name = "touch"
command = "touch"
args = ["ran-here"]
"#,
        );
        let config = test_config(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        let package = ws.current().unwrap();

        run_tests(&ws, package, &TestOptions::default()).unwrap();
        assert!(dir.path().join("ran-here").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_harness_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_ws(
            dir.path(),
            r#"[package]
name = "demo"
version = "0.1.0"

[[test]]
name = "bad"
command = "false"
"#,
        );
        let config = test_config(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        let package = ws.current().unwrap();

        let err = run_tests(&ws, package, &TestOptions::default()).unwrap_err();
        assert!(err.to_string().contains("test harness `bad` failed"));
        let code = err.downcast_ref::<HarnessError>().and_then(HarnessError::code);
        assert_eq!(code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn no_fail_fast_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_ws(
            dir.path(),
            r#"[package]
name = "demo"
version = "0.1.0"

[[test]]
name = "bad-one"
command = "false"

[[test]]
name = "bad-two"
command = "false"
"#,
        );
        let config = test_config(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        let package = ws.current().unwrap();

        let opts = TestOptions {
            no_fail_fast: true,
            ..Default::default()
        };
        let err = run_tests(&ws, package, &opts).unwrap_err();
        assert_eq!(err.to_string(), "2 test harnesses failed");
    }

    #[test]
    fn unknown_filter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_ws(
            dir.path(),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        );
        let config = test_config(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        let package = ws.current().unwrap();

        let opts = TestOptions {
            filter: Some("nope".to_string()),
            ..Default::default()
        };
        let err = run_tests(&ws, package, &opts).unwrap_err();
        assert!(err.to_string().contains("no test harness named `nope`"));
    }
}
