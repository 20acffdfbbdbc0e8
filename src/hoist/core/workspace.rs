use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::core::{Package, PackageIdSpec};
use crate::util::edit_distance::closest_msg;
use crate::util::important_paths::MANIFEST_FILENAME;
use crate::util::{Config, HoistResult};

/// A project on disk: the root manifest plus any workspace members.
///
/// A `Hoist.toml` with a `[workspace]` table pulls its listed member
/// directories into the workspace. A plain package manifest forms a
/// single-member workspace of itself.
#[derive(Debug)]
pub struct Workspace<'cfg> {
    config: &'cfg Config,
    /// Path to the root `Hoist.toml`.
    root_manifest: PathBuf,
    /// Every package in the workspace. The root package, if the root
    /// manifest is not virtual, is the first entry.
    members: Vec<Package>,
    /// Index into `members` for the root package, if any.
    current: Option<usize>,
}

impl<'cfg> Workspace<'cfg> {
    /// Opens the workspace rooted at `manifest_path`.
    pub fn new(manifest_path: &Path, config: &'cfg Config) -> HoistResult<Workspace<'cfg>> {
        let root = Package::load(manifest_path)?;
        let mut members = Vec::new();
        let mut current = None;

        let member_dirs: Vec<String> = root
            .manifest()
            .workspace
            .as_ref()
            .map(|ws| ws.members.clone())
            .unwrap_or_default();

        if root.manifest().package.is_some() {
            current = Some(0);
            members.push(root);
        } else if member_dirs.is_empty() {
            bail!(
                "manifest at `{}` contains no `[package]` or `[workspace]` table",
                manifest_path.display()
            );
        } else {
            members.push(root);
        }

        let root_dir = manifest_path.parent().unwrap();
        for member in &member_dirs {
            let member_manifest = root_dir.join(member).join(MANIFEST_FILENAME);
            if !member_manifest.exists() {
                bail!(
                    "workspace member `{member}` is missing its `{MANIFEST_FILENAME}` \
                     (expected at `{}`)",
                    member_manifest.display()
                );
            }
            let package = Package::load(&member_manifest)?;
            package.package_table()?;
            members.push(package);
        }

        // Drop the virtual root from the member list, it has no package.
        if current.is_none() {
            members.remove(0);
        }

        Ok(Workspace {
            config,
            root_manifest: manifest_path.to_path_buf(),
            members,
            current,
        })
    }

    pub fn config(&self) -> &'cfg Config {
        self.config
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        self.root_manifest.parent().unwrap()
    }

    pub fn root_manifest(&self) -> &Path {
        &self.root_manifest
    }

    /// Path to the lockfile, next to the root manifest.
    pub fn lockfile_path(&self) -> PathBuf {
        self.root().join("Hoist.lock")
    }

    /// The build/output directory of the workspace.
    pub fn target_dir(&self) -> PathBuf {
        self.root().join("target")
    }

    pub fn members(&self) -> impl Iterator<Item = &Package> {
        self.members.iter()
    }

    pub fn is_virtual(&self) -> bool {
        self.current.is_none()
    }

    /// The package the command was invoked for, erroring in a virtual
    /// workspace where `-p` is required.
    pub fn current(&self) -> HoistResult<&Package> {
        match self.current {
            Some(i) => Ok(&self.members[i]),
            None => bail!(
                "manifest at `{}` is a virtual workspace; \
                 select a member with the `--package` flag",
                self.root_manifest.display()
            ),
        }
    }

    /// Selects a member by `-p` spec, falling back to the current package.
    pub fn select_package(&self, spec: Option<&str>) -> HoistResult<&Package> {
        let Some(spec) = spec else {
            return self.current();
        };
        let spec = PackageIdSpec::parse(spec)?;
        let mut matches = self.members.iter().filter(|member| {
            member
                .package_id()
                .map(|id| spec.matches(&id))
                .unwrap_or(false)
        });
        let Some(found) = matches.next() else {
            let suggestion = closest_msg(
                spec.name(),
                self.members.iter(),
                |member| member.name().unwrap_or(""),
            );
            bail!(
                "package ID specification `{spec}` did not match any packages \
                 in the workspace{suggestion}"
            );
        };
        if matches.next().is_some() {
            bail!("package ID specification `{spec}` matched more than one workspace member");
        }
        Ok(found)
    }
}
