//! The TOML manifest (`Hoist.toml`) as deserialized by serde, plus the
//! [`Package`] wrapper the rest of the crate works with.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use semver::Version;
use serde::Deserialize;

use crate::core::dependency::DepKind;
use crate::core::{PackageId, SourceId};
use crate::util::{paths, HoistResult};

/// The `Hoist.toml` file as deserialized by serde.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlManifest {
    pub package: Option<TomlPackage>,
    pub workspace: Option<TomlWorkspace>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, TomlDependency>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, TomlDependency>,
    #[serde(default)]
    pub build_dependencies: BTreeMap<String, TomlDependency>,
    #[serde(default)]
    pub target: BTreeMap<String, TomlPlatform>,
    pub lib: Option<TomlTarget>,
    /// `[[test]]` harness declarations.
    #[serde(default, rename = "test")]
    pub tests: Vec<TomlHarness>,
    /// `[[bench]]` harness declarations.
    #[serde(default, rename = "bench")]
    pub benches: Vec<TomlHarness>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlPackage {
    pub name: String,
    pub version: Version,
    pub description: Option<String>,
    pub documentation: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// `publish = false` blocks `hoist publish`.
    pub publish: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlWorkspace {
    #[serde(default)]
    pub members: Vec<String>,
}

/// A dependency entry, either `foo = "1.0"` or a detailed table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TomlDependency {
    Simple(String),
    Detailed(DetailedTomlDependency),
}

impl TomlDependency {
    /// The version requirement, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            TomlDependency::Simple(v) => Some(v),
            TomlDependency::Detailed(d) => d.version.as_deref(),
        }
    }

    /// The relative path of a path dependency.
    pub fn path(&self) -> Option<&str> {
        match self {
            TomlDependency::Simple(_) => None,
            TomlDependency::Detailed(d) => d.path.as_deref(),
        }
    }

    /// The real package name, honoring a `package = "..."` rename.
    pub fn package_name<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            TomlDependency::Simple(_) => key,
            TomlDependency::Detailed(d) => d.package.as_deref().unwrap_or(key),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedTomlDependency {
    pub version: Option<String>,
    pub path: Option<String>,
    pub registry: Option<String>,
    pub package: Option<String>,
    pub optional: Option<bool>,
    pub default_features: Option<bool>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// A `[target.'cfg(...)']` table, holding platform-specific dependencies.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlPlatform {
    #[serde(default)]
    pub dependencies: BTreeMap<String, TomlDependency>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, TomlDependency>,
    #[serde(default)]
    pub build_dependencies: BTreeMap<String, TomlDependency>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlTarget {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// A named test or bench harness, run by `hoist test` / `hoist bench`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TomlHarness {
    pub name: String,
    /// The program to execute.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A package along with the path to its manifest.
#[derive(Debug)]
pub struct Package {
    manifest: TomlManifest,
    manifest_path: PathBuf,
}

impl Package {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> HoistResult<Package> {
        let contents = paths::read(path)?;
        let manifest: TomlManifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest at `{}`", path.display()))?;
        Ok(Package {
            manifest,
            manifest_path: path.to_path_buf(),
        })
    }

    pub fn manifest(&self) -> &TomlManifest {
        &self.manifest
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// The directory containing the manifest.
    pub fn root(&self) -> &Path {
        self.manifest_path.parent().unwrap()
    }

    /// The `[package]` table, or an error for a virtual manifest.
    pub fn package_table(&self) -> HoistResult<&TomlPackage> {
        self.manifest.package.as_ref().ok_or_else(|| {
            anyhow::format_err!(
                "manifest at `{}` is virtual and has no `[package]` table",
                self.manifest_path.display()
            )
        })
    }

    pub fn name(&self) -> HoistResult<&str> {
        Ok(&self.package_table()?.name)
    }

    pub fn version(&self) -> HoistResult<&Version> {
        Ok(&self.package_table()?.version)
    }

    /// The package ID, with a path source rooted at the manifest dir.
    pub fn package_id(&self) -> HoistResult<PackageId> {
        let package = self.package_table()?;
        let source = SourceId::for_path(self.root())?;
        Ok(PackageId::new(
            package.name.clone(),
            package.version.clone(),
            source,
        ))
    }

    /// Whether publishing is blocked by `publish = false`.
    pub fn publish_enabled(&self) -> bool {
        self.manifest
            .package
            .as_ref()
            .and_then(|p| p.publish)
            .unwrap_or(true)
    }

    /// All dependencies across every table, with their kind.
    pub fn dependencies(&self) -> Vec<(String, DepKind, TomlDependency)> {
        let mut out = Vec::new();
        let mut push = |deps: &BTreeMap<String, TomlDependency>, kind| {
            for (key, dep) in deps {
                out.push((dep.package_name(key).to_string(), kind, dep.clone()));
            }
        };
        push(&self.manifest.dependencies, DepKind::Normal);
        push(&self.manifest.dev_dependencies, DepKind::Development);
        push(&self.manifest.build_dependencies, DepKind::Build);
        for platform in self.manifest.target.values() {
            push(&platform.dependencies, DepKind::Normal);
            push(&platform.dev_dependencies, DepKind::Development);
            push(&platform.build_dependencies, DepKind::Build);
        }
        out
    }

    /// Declared test harnesses.
    pub fn test_harnesses(&self) -> &[TomlHarness] {
        &self.manifest.tests
    }

    /// Declared bench harnesses.
    pub fn bench_harnesses(&self) -> &[TomlHarness] {
        &self.manifest.benches
    }

    /// The library target source path, `src/lib.rs` unless overridden.
    pub fn lib_path(&self) -> PathBuf {
        let rel = self
            .manifest
            .lib
            .as_ref()
            .and_then(|l| l.path.as_deref())
            .unwrap_or("src/lib.rs");
        self.root().join(rel)
    }
}
