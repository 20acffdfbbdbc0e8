use crate::core::{PackageId, PackageIdSpec, SourceId, Workspace};
use crate::ops::lockfile::lockfile_required;
use crate::util::HoistResult;

/// Resolves a (possibly partial) spec against the lockfile and returns the
/// fully-qualified package ID.
pub fn pkgid(ws: &Workspace<'_>, spec: Option<&str>) -> HoistResult<PackageIdSpec> {
    let resolve = lockfile_required(ws)?;

    let spec = match spec {
        Some(spec) => PackageIdSpec::parse(spec)?,
        None => {
            let current = ws.current()?;
            PackageIdSpec::parse(current.name()?)?
        }
    };

    // Entries without a recorded source are workspace members; their source
    // is the path they live at.
    let ws_source = SourceId::for_path(ws.root())?;
    let ids: Vec<PackageId> = resolve
        .iter()
        .map(|p| p.package_id_with_default(&ws_source))
        .collect();

    let package_id = spec.query(ids)?;
    Ok(PackageIdSpec::from_package_id(&package_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LockedPackage, Resolve, Shell};
    use crate::ops::lockfile::write_lockfile;
    use crate::util::Config;
    use semver::Version;

    fn test_ws(dir: &std::path::Path) -> std::path::PathBuf {
        let manifest = dir.join("Hoist.toml");
        std::fs::write(&manifest, "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        manifest
    }

    #[test]
    fn resolves_partial_specs() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            dir.path().to_path_buf(),
            dir.path().join(".hoist"),
        );
        let manifest = test_ws(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();

        let resolve = Resolve::new(vec![
            LockedPackage {
                name: "demo".to_string(),
                version: Version::parse("0.1.0").unwrap(),
                source: None,
                checksum: None,
                dependencies: vec!["serde".to_string()],
            },
            LockedPackage {
                name: "serde".to_string(),
                version: Version::parse("1.0.210").unwrap(),
                source: Some(SourceId::default_registry()),
                checksum: None,
                dependencies: vec![],
            },
        ]);
        write_lockfile(&ws, &resolve).unwrap();

        let id = pkgid(&ws, Some("serde")).unwrap();
        assert_eq!(
            id.to_string(),
            "registry+https://hoisthub.io/#serde@1.0.210"
        );

        // No spec means the current package.
        let id = pkgid(&ws, None).unwrap();
        assert!(id.to_string().ends_with("#demo@0.1.0"));

        assert!(pkgid(&ws, Some("nope")).is_err());
    }

    #[test]
    fn requires_a_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            dir.path().to_path_buf(),
            dir.path().join(".hoist"),
        );
        let manifest = test_ws(dir.path());
        let ws = Workspace::new(&manifest, &config).unwrap();
        let err = pkgid(&ws, Some("demo")).unwrap_err();
        assert!(err.to_string().contains("Hoist.lock"));
    }
}
