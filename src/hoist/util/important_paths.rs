use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::errors::ManifestNotFound;

/// The name of the package manifest file.
pub const MANIFEST_FILENAME: &str = "Hoist.toml";

/// Finds the root manifest, searching upward from the given directory.
pub fn find_root_manifest_for_wd(cwd: &Path) -> Result<PathBuf> {
    for current in cwd.ancestors() {
        let manifest = current.join(MANIFEST_FILENAME);
        if manifest.exists() {
            return Ok(manifest);
        }
    }

    Err(ManifestNotFound {
        name: MANIFEST_FILENAME,
        cwd: cwd.to_path_buf(),
    }
    .into())
}

/// Returns the path to the `file` in `pwd`, if it exists.
pub fn find_project_manifest_exact(pwd: &Path, file: &str) -> Result<PathBuf> {
    let manifest = pwd.join(file);

    if manifest.exists() {
        Ok(manifest)
    } else {
        anyhow::bail!("Could not find `{}` in `{}`", file, pwd.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_manifest_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(MANIFEST_FILENAME), "[package]").unwrap();
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_root_manifest_for_wd(&nested).unwrap();
        assert_eq!(found, root.join(MANIFEST_FILENAME));
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_root_manifest_for_wd(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Hoist.toml"));
    }
}
