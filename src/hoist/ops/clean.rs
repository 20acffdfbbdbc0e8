//! Deletes build output from the target directory.

use std::path::{Path, PathBuf};

use crate::core::Workspace;
use crate::util::{human_readable_bytes, paths, HoistResult};

pub struct CleanOptions {
    /// Only delete the documentation output.
    pub doc: bool,
    pub dry_run: bool,
    /// Overrides the workspace target directory.
    pub target_dir: Option<PathBuf>,
}

pub fn clean(ws: &Workspace<'_>, opts: &CleanOptions) -> HoistResult<()> {
    let config = ws.config();
    let target_dir = match &opts.target_dir {
        Some(dir) => config.cwd().join(dir),
        None => ws.target_dir(),
    };
    let path = if opts.doc {
        target_dir.join("doc")
    } else {
        target_dir
    };

    let (files, bytes) = measure(&path);
    if files == 0 {
        config.shell().status("Removed", "0 files")?;
        return Ok(());
    }

    config
        .shell()
        .verbose(|shell| shell.status("Removing", path.display()))?;

    if opts.dry_run {
        report(ws, files, bytes)?;
        config
            .shell()
            .warn("no files deleted due to --dry-run")?;
        return Ok(());
    }

    paths::remove_dir_all(&path)?;
    report(ws, files, bytes)
}

fn report(ws: &Workspace<'_>, files: u64, bytes: u64) -> HoistResult<()> {
    let (size, unit) = human_readable_bytes(bytes);
    ws.config().shell().status(
        "Removed",
        format!(
            "{files} {} {size:.1}{unit} total",
            if files == 1 { "file," } else { "files," }
        ),
    )
}

/// Counts the files under `path` and their total size.
fn measure(path: &Path) -> (u64, u64) {
    let mut files = 0;
    let mut bytes = 0;
    for entry in walkdir::WalkDir::new(path).into_iter().flatten() {
        if entry.file_type().is_file() {
            files += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    (files, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Shell;
    use crate::util::Config;

    #[test]
    fn clean_removes_target() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Hoist.toml");
        std::fs::write(&manifest, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        let target = dir.path().join("target");
        std::fs::create_dir_all(target.join("debug")).unwrap();
        std::fs::write(target.join("debug").join("out.bin"), b"binary").unwrap();

        let config = Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            dir.path().to_path_buf(),
            dir.path().join(".hoist"),
        );
        let ws = Workspace::new(&manifest, &config).unwrap();

        clean(&ws, &CleanOptions { doc: false, dry_run: true, target_dir: None }).unwrap();
        assert!(target.exists());

        clean(&ws, &CleanOptions { doc: false, dry_run: false, target_dir: None }).unwrap();
        assert!(!target.exists());

        // Cleaning an already-clean tree is not an error.
        clean(&ws, &CleanOptions { doc: false, dry_run: false, target_dir: None }).unwrap();
    }

    #[test]
    fn clean_doc_only_touches_doc() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Hoist.toml");
        std::fs::write(&manifest, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        let target = dir.path().join("target");
        std::fs::create_dir_all(target.join("doc")).unwrap();
        std::fs::write(target.join("doc").join("index.html"), "<html>").unwrap();
        std::fs::write(target.join("other"), "keep").unwrap();

        let config = Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            dir.path().to_path_buf(),
            dir.path().join(".hoist"),
        );
        let ws = Workspace::new(&manifest, &config).unwrap();

        clean(&ws, &CleanOptions { doc: true, dry_run: false, target_dir: None }).unwrap();
        assert!(!target.join("doc").exists());
        assert!(target.join("other").exists());
    }
}
