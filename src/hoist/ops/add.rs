//! Core of `hoist add`.

use std::collections::BTreeSet;

use anyhow::{bail, Context as _};
use semver::Version;

use crate::core::{LockedPackage, Package, Resolve, SourceId, Workspace};
use crate::ops::lockfile::{load_lockfile, write_lockfile};
use crate::ops::registry::{registry, registry_source_id, RegistryOrIndex};
use crate::util::semver_ext::PartialVersion;
use crate::util::toml_mut::dependency::{Dependency, PathSource, RegistrySource};
use crate::util::toml_mut::manifest::{DepTable, LocalManifest};
use crate::util::HoistResult;

pub struct AddOptions {
    pub deps: Vec<DepOp>,
    /// Which dependency table to add to.
    pub section: DepTable,
    pub dry_run: bool,
    pub reg_or_index: Option<RegistryOrIndex>,
}

/// One package to add, as parsed from the command line.
#[derive(Debug, Default)]
pub struct DepOp {
    /// `name` or `name@version-req`.
    pub spec: String,
    pub rename: Option<String>,
    pub features: Option<BTreeSet<String>>,
    pub default_features: Option<bool>,
    pub optional: Option<bool>,
    /// Filesystem path for a path dependency.
    pub path: Option<String>,
}

/// Adds dependencies to a manifest and records the pinned versions in the
/// lockfile.
pub fn add(ws: &Workspace<'_>, package: &Package, options: &AddOptions) -> HoistResult<()> {
    let config = ws.config();
    let mut manifest = LocalManifest::try_new(package.manifest_path())?;
    let mut pinned: Vec<LockedPackage> = Vec::new();

    for dep_op in &options.deps {
        let (dep, locked) = resolve_dep(ws, package, dep_op, options)?;

        config.shell().status(
            "Adding",
            format!(
                "{} v{} to {}",
                dep.name,
                locked.version,
                options.section.kind().kind_table()
            ),
        )?;
        if let Some(features) = &dep.features {
            let list = features.iter().cloned().collect::<Vec<_>>().join(", ");
            config.shell().status("Features", format!("+ {list}"))?;
        }

        manifest.insert_into_table(&options.section, &dep)?;
        pinned.push(locked);
    }

    if options.dry_run {
        config.shell().warn("aborting add due to dry run")?;
        return Ok(());
    }

    manifest.write()?;
    update_lockfile(ws, package, &pinned)?;
    Ok(())
}

/// Turns a `DepOp` into a manifest entry plus a pinned lockfile entry.
fn resolve_dep(
    ws: &Workspace<'_>,
    package: &Package,
    dep_op: &DepOp,
    options: &AddOptions,
) -> HoistResult<(Dependency, LockedPackage)> {
    let config = ws.config();
    let (name, requested) = match dep_op.spec.split_once('@') {
        Some((name, req)) => (name, Some(req)),
        None => (dep_op.spec.as_str(), None),
    };
    if name.is_empty() {
        bail!("invalid package specification `{}`", dep_op.spec);
    }
    if name == package.name()? {
        bail!("cannot add `{name}` as a dependency to itself");
    }

    let mut dep = Dependency::new(name);
    if let Some(rename) = &dep_op.rename {
        dep = dep.set_rename(rename);
    }
    if let Some(features) = &dep_op.features {
        dep = dep.set_features(features.clone());
    }
    if let Some(default_features) = dep_op.default_features {
        dep = dep.set_default_features(default_features);
    }
    if let Some(optional) = dep_op.optional {
        dep = dep.set_optional(optional);
    }

    if let Some(path) = &dep_op.path {
        if requested.is_some() {
            bail!("cannot specify both a version and a path for `{name}`");
        }
        let abs = crate::util::paths::normalize_path(&config.cwd().join(path));
        let dep_manifest = abs.join("Hoist.toml");
        let dep_package = Package::load(&dep_manifest)
            .with_context(|| format!("`{path}` does not contain a package"))?;
        if dep_package.name()? != name {
            bail!(
                "path `{path}` contains package `{}`, not `{name}`",
                dep_package.name()?
            );
        }
        let version = dep_package.version()?.clone();
        let source = SourceId::for_path(&abs)?;
        let dep = dep.set_source(PathSource::new(path));
        let locked = LockedPackage {
            name: name.to_string(),
            version,
            source: Some(source),
            checksum: None,
            dependencies: Vec::new(),
        };
        return Ok((dep, locked));
    }

    // Registry dependency. Pin an exact version, asking the registry for the
    // newest match unless the requirement is already exact. An exact
    // requirement stays usable offline, though the lockfile entry then has no
    // checksum for `fetch` to verify.
    let exact_requested = requested.and_then(|raw| raw.parse::<Version>().ok());
    if !config.network_allowed() {
        let Some(exact) = exact_requested else {
            bail!(
                "cannot query the registry while offline; \
                 specify an exact version with `{name}@<version>`"
            );
        };
        let dep = dep.set_source(RegistrySource::new(exact.to_string()));
        let locked = locked_registry_package(config, options, name, exact, None)?;
        return Ok((dep, locked));
    }

    let mut api = registry(config, None, options.reg_or_index.as_ref(), false)?;
    let info = api
        .package_info(name)
        .with_context(|| format!("failed to look up `{name}` on `{}`", api.host()))?;

    let exact = match (&exact_requested, requested) {
        (Some(exact), _) => exact.clone(),
        (None, None) => info
            .package
            .max_version
            .parse::<Version>()
            .with_context(|| {
                format!(
                    "registry reported invalid version `{}` for `{name}`",
                    info.package.max_version
                )
            })?,
        (None, Some(raw)) => {
            let partial: PartialVersion = raw
                .parse()
                .with_context(|| format!("invalid version requirement `{raw}`"))?;
            let mut matching: Vec<Version> = info
                .versions
                .iter()
                .filter(|v| !v.yanked)
                .filter_map(|v| v.num.parse().ok())
                .filter(|v| partial.matches(v))
                .collect();
            matching.sort();
            matching.pop().ok_or_else(|| {
                anyhow::format_err!("`{name}` has no version matching `{raw}`")
            })?
        }
    };

    let checksum = info
        .versions
        .iter()
        .find(|v| v.num == exact.to_string())
        .and_then(|v| v.checksum.clone());
    let req = requested.map(str::to_string).unwrap_or_else(|| exact.to_string());
    let dep = dep.set_source(RegistrySource::new(req));
    let locked = locked_registry_package(config, options, name, exact, checksum)?;
    Ok((dep, locked))
}

fn locked_registry_package(
    config: &crate::util::Config,
    options: &AddOptions,
    name: &str,
    version: Version,
    checksum: Option<String>,
) -> HoistResult<LockedPackage> {
    Ok(LockedPackage {
        name: name.to_string(),
        version,
        source: Some(registry_source_id(config, options.reg_or_index.as_ref())?),
        checksum,
        dependencies: Vec::new(),
    })
}

/// Merges the pinned packages into the lockfile, creating it if needed.
fn update_lockfile(
    ws: &Workspace<'_>,
    package: &Package,
    pinned: &[LockedPackage],
) -> HoistResult<()> {
    let root_name = package.name()?.to_string();
    let mut packages = match load_lockfile(ws)? {
        Some(resolve) => resolve.into_packages(),
        None => Vec::new(),
    };

    // Drop stale entries for the packages being (re)added.
    packages.retain(|p| {
        p.name == root_name || !pinned.iter().any(|new| new.name == p.name)
    });

    let root_index = match packages.iter().position(|p| p.name == root_name) {
        Some(i) => i,
        None => {
            packages.push(LockedPackage {
                name: root_name.clone(),
                version: package.version()?.clone(),
                source: None,
                checksum: None,
                dependencies: Vec::new(),
            });
            packages.len() - 1
        }
    };
    let root = &mut packages[root_index];
    for new in pinned {
        if !root.dependencies.contains(&new.name) {
            root.dependencies.push(new.name.clone());
        }
    }
    root.dependencies.sort();

    packages.extend(pinned.iter().cloned());
    write_lockfile(ws, &Resolve::new(packages))
}
