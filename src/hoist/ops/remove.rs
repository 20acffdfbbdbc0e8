//! Core of `hoist remove`.

use crate::core::{Package, Resolve, Workspace};
use crate::ops::lockfile::{load_lockfile, write_lockfile};
use crate::util::toml_mut::manifest::{DepTable, LocalManifest};
use crate::util::HoistResult;

pub struct RemoveOptions {
    /// Dependency names to remove.
    pub deps: Vec<String>,
    /// Which table to remove from.
    pub section: DepTable,
    pub dry_run: bool,
}

/// Removes dependencies from a manifest and prunes newly-unreachable entries
/// from the lockfile.
pub fn remove(ws: &Workspace<'_>, package: &Package, options: &RemoveOptions) -> HoistResult<()> {
    let config = ws.config();
    let mut manifest = LocalManifest::try_new(package.manifest_path())?;

    for name in &options.deps {
        config.shell().status(
            "Removing",
            format!("{name} from {}", options.section.kind().kind_table()),
        )?;
        if let Err(err) = manifest.remove_from_table(&options.section, name) {
            // Point at the tables that do have the dep, if any.
            let mut present: Vec<String> = manifest
                .dependency_keys()
                .into_iter()
                .filter(|(_, dep)| dep == name)
                .map(|(table, _)| format!("`{}`", table.kind().kind_table()))
                .collect();
            present.dedup();
            if present.is_empty() {
                return Err(err);
            }
            anyhow::bail!("{err}; it is present in {}", present.join(", "));
        }
    }

    if options.dry_run {
        config.shell().warn("aborting remove due to dry run")?;
        return Ok(());
    }

    manifest.write()?;
    gc_lockfile(ws, &manifest)?;
    Ok(())
}

/// Prunes lockfile entries no longer reachable from any workspace member's
/// remaining dependencies.
fn gc_lockfile(ws: &Workspace<'_>, manifest: &LocalManifest) -> HoistResult<()> {
    let Some(resolve) = load_lockfile(ws)? else {
        return Ok(());
    };

    // Lockfile edges use real package names, so resolve any
    // `package = "…"` renames before deciding what is still declared.
    let remaining = manifest.dependency_package_names();

    let mut packages = resolve.into_packages();
    for member in ws.members() {
        let member_name = member.name()?;
        if manifest.package_name() == Some(member_name) {
            for package in packages.iter_mut().filter(|p| p.name == member_name) {
                package
                    .dependencies
                    .retain(|dep| remaining.contains(dep));
            }
        }
    }

    let roots: Vec<&str> = ws
        .members()
        .map(|m| m.name())
        .collect::<HoistResult<Vec<_>>>()?;
    let mut resolve = Resolve::new(packages);
    resolve.retain_reachable(&roots);
    write_lockfile(ws, &resolve)
}
