//! Reading and writing `Hoist.lock`.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::core::{LockedPackage, Resolve, Workspace};
use crate::util::{paths, HoistResult};

/// The current lockfile format version.
const LOCKFILE_VERSION: u32 = 1;

const HEADER: &str = "\
# This file is automatically generated by hoist.
# It is not intended for manual editing.
";

#[derive(Serialize, Deserialize)]
struct EncodableResolve {
    version: u32,
    #[serde(default, rename = "package")]
    packages: Vec<LockedPackage>,
}

/// Loads the lockfile for the workspace, if one exists.
pub fn load_lockfile(ws: &Workspace<'_>) -> HoistResult<Option<Resolve>> {
    let path = ws.lockfile_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = paths::read(&path)?;
    let encodable: EncodableResolve = toml::from_str(&contents)
        .with_context(|| format!("failed to parse lock file at `{}`", path.display()))?;
    if encodable.version > LOCKFILE_VERSION {
        anyhow::bail!(
            "lock file version {} requires a newer version of hoist",
            encodable.version
        );
    }
    Ok(Some(Resolve::new(encodable.packages)))
}

/// Loads the lockfile, erroring if it does not exist.
pub fn lockfile_required(ws: &Workspace<'_>) -> HoistResult<Resolve> {
    load_lockfile(ws)?.ok_or_else(|| {
        anyhow::format_err!(
            "a `Hoist.lock` must exist at `{}` for this command",
            ws.root().display()
        )
    })
}

/// Writes the lockfile if it changed.
///
/// The emitted bytes are deterministic for a given resolve. If the on-disk
/// file already matches, nothing is written, keeping mtimes stable.
pub fn write_lockfile(ws: &Workspace<'_>, resolve: &Resolve) -> HoistResult<()> {
    let path = ws.lockfile_path();
    let out = serialize_resolve(resolve)?;

    if let Ok(existing) = std::fs::read_to_string(&path) {
        if existing == out {
            return Ok(());
        }
    }

    let config = ws.config();
    if !config.lock_update_allowed() {
        let flag = if config.frozen() { "--frozen" } else { "--locked" };
        anyhow::bail!(
            "the lock file {} needs to be updated but {flag} was passed to prevent this",
            path.display()
        );
    }

    paths::write_atomic(&path, out)?;
    Ok(())
}

fn serialize_resolve(resolve: &Resolve) -> HoistResult<String> {
    let encodable = EncodableResolve {
        version: LOCKFILE_VERSION,
        packages: resolve.iter().cloned().collect(),
    };
    let body = toml::to_string(&encodable).context("failed to serialize lock file")?;
    Ok(format!("{HEADER}{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Shell, SourceId};
    use crate::util::Config;
    use semver::Version;
    use std::path::Path;

    fn test_config(cwd: &Path) -> Config {
        Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            cwd.to_path_buf(),
            cwd.join(".hoist"),
        )
    }

    fn test_resolve() -> Resolve {
        Resolve::new(vec![
            LockedPackage {
                name: "serde".to_string(),
                version: Version::parse("1.0.210").unwrap(),
                source: Some(SourceId::default_registry()),
                checksum: Some("deadbeef".to_string()),
                dependencies: vec![],
            },
            LockedPackage {
                name: "demo".to_string(),
                version: Version::parse("0.1.0").unwrap(),
                source: None,
                checksum: None,
                dependencies: vec!["serde".to_string()],
            },
        ])
    }

    fn test_workspace(dir: &Path) -> std::path::PathBuf {
        let manifest = dir.join("Hoist.toml");
        std::fs::write(&manifest, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        manifest
    }

    #[test]
    fn round_trip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let manifest = test_workspace(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();

        let resolve = test_resolve();
        write_lockfile(&ws, &resolve).unwrap();
        let first = std::fs::read_to_string(ws.lockfile_path()).unwrap();
        assert!(first.starts_with("# This file is automatically generated by hoist."));

        let reloaded = load_lockfile(&ws).unwrap().unwrap();
        assert_eq!(reloaded, resolve);

        write_lockfile(&ws, &reloaded).unwrap();
        let second = std::fs::read_to_string(ws.lockfile_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn locked_blocks_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.configure(0, false, None, false, true, false).unwrap();
        let manifest = test_workspace(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();

        let err = write_lockfile(&ws, &test_resolve()).unwrap_err();
        assert!(err.to_string().contains("--locked"));

        // A no-op write is allowed even when locked.
        let mut unlocked = test_config(dir.path());
        unlocked.configure(0, false, None, false, false, false).unwrap();
        let ws_unlocked = Workspace::new(&manifest, &unlocked).unwrap();
        write_lockfile(&ws_unlocked, &test_resolve()).unwrap();
        write_lockfile(&ws, &test_resolve()).unwrap();
    }

    #[test]
    fn missing_lockfile_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let manifest = test_workspace(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        assert!(load_lockfile(&ws).unwrap().is_none());
        let err = lockfile_required(&ws).unwrap_err();
        assert!(err.to_string().contains("Hoist.lock"));
    }
}
