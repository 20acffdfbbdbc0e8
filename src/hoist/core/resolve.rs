use std::collections::{BTreeSet, VecDeque};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{PackageId, SourceId};

/// The lockfile graph: every package pinned to an exact version, with the
/// names of its dependencies.
///
/// Packages are kept sorted by name then version so the serialized lockfile
/// is deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Resolve {
    packages: Vec<LockedPackage>,
}

/// One `[[package]]` entry in `Hoist.lock`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LockedPackage {
    pub name: String,
    pub version: Version,
    /// Absent for workspace members and path dependencies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    /// Sha256 of the registry archive. Absent for path sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Names of direct dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl LockedPackage {
    /// The package ID, if the package has an explicit source.
    pub fn package_id(&self) -> Option<PackageId> {
        let source = self.source.clone()?;
        Some(PackageId::new(
            self.name.clone(),
            self.version.clone(),
            source,
        ))
    }

    /// The package ID, substituting `default_source` when none is recorded.
    pub fn package_id_with_default(&self, default_source: &SourceId) -> PackageId {
        PackageId::new(
            self.name.clone(),
            self.version.clone(),
            self.source.clone().unwrap_or_else(|| default_source.clone()),
        )
    }
}

impl Resolve {
    pub fn new(mut packages: Vec<LockedPackage>) -> Resolve {
        packages.sort();
        packages.dedup();
        Resolve { packages }
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockedPackage> {
        self.packages.iter()
    }

    pub fn into_packages(self) -> Vec<LockedPackage> {
        self.packages
    }

    /// All entries with the given name.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LockedPackage> {
        self.packages.iter().filter(move |p| p.name == name)
    }

    /// Drops every package that is not reachable from `roots` by following
    /// dependency edges. Used by `hoist remove` to prune the lockfile
    /// without re-resolving.
    pub fn retain_reachable(&mut self, roots: &[&str]) {
        let mut reachable: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = roots.iter().copied().collect();
        while let Some(name) = queue.pop_front() {
            if !reachable.insert(name) {
                continue;
            }
            for package in self.packages.iter().filter(|p| p.name == name) {
                for dep in &package.dependencies {
                    if !reachable.contains(dep.as_str()) {
                        queue.push_back(dep);
                    }
                }
            }
        }
        let reachable: BTreeSet<String> = reachable.into_iter().map(str::to_string).collect();
        self.packages.retain(|p| reachable.contains(&p.name));
    }
}
