use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use flate2::write::GzEncoder;
use flate2::Compression;

use registry_api::{NewPackage, NewPackageDependency};

use crate::core::manifest::TomlDependency;
use crate::core::{DepKind, Package, Workspace};
use crate::ops::registry::{registry, RegistryOrIndex};
use crate::util::auth::Secret;
use crate::util::{human_readable_bytes, paths, HoistResult};

pub struct PublishOpts {
    pub token: Option<Secret<String>>,
    pub reg_or_index: Option<RegistryOrIndex>,
    pub dry_run: bool,
}

/// Packages the selected project and uploads it to the registry.
pub fn publish(ws: &Workspace<'_>, package: &Package, opts: PublishOpts) -> HoistResult<()> {
    let config = ws.config();
    let name = package.name()?;
    let version = package.version()?.clone();

    if !package.publish_enabled() {
        bail!(
            "`{name}` cannot be published.\n\
             `package.publish` is set to `false` in the manifest"
        );
    }
    check_metadata(ws, package)?;
    let new_package = transmit_metadata(package)?;

    config
        .shell()
        .status("Packaging", format!("{name} v{version}"))?;
    let tarball_path = package_tarball(ws, package)?;
    let tarball = File::open(&tarball_path)
        .with_context(|| format!("failed to open `{}`", tarball_path.display()))?;
    let size = tarball.metadata().map(|m| m.len()).unwrap_or(0);
    config.shell().verbose(|shell| {
        let (size, unit) = human_readable_bytes(size);
        shell.status("Packaged", format!("{size:.1}{unit} at `{}`", tarball_path.display()))
    })?;

    if opts.dry_run {
        config.shell().warn("aborting upload due to dry run")?;
        return Ok(());
    }

    let mut registry = registry(config, opts.token, opts.reg_or_index.as_ref(), true)?;
    config
        .shell()
        .status("Uploading", format!("{name} v{version} to {}", registry.host()))?;
    let warnings = registry
        .publish(&new_package, &tarball)
        .context("failed to publish to registry")?;

    for warning in warnings.invalid_categories.iter().chain(&warnings.other) {
        config.shell().warn(warning)?;
    }

    config
        .shell()
        .status("Published", format!("{name} v{version}"))?;
    Ok(())
}

/// Warns about manifest fields the registry wants filled in.
fn check_metadata(ws: &Workspace<'_>, package: &Package) -> HoistResult<()> {
    let toml = package.package_table()?;
    let mut missing = Vec::new();
    if toml.description.is_none() {
        missing.push("description");
    }
    if toml.license.is_none() {
        missing.push("license");
    }
    if !missing.is_empty() {
        ws.config().shell().warn(format!(
            "manifest has no {}.\n\
             See the registry's metadata guidelines for how to fill these in.",
            missing.join(" or ")
        ))?;
    }
    Ok(())
}

/// Builds the JSON metadata sent alongside the tarball.
fn transmit_metadata(package: &Package) -> HoistResult<NewPackage> {
    let toml = package.package_table()?;
    let manifest = package.manifest();

    let mut deps = Vec::new();
    let mut push_table =
        |table: &std::collections::BTreeMap<String, TomlDependency>,
         kind: DepKind,
         target: Option<&str>|
         -> HoistResult<()> {
            for (key, dep) in table {
                let name = dep.package_name(key);
                let Some(version_req) = dep.version() else {
                    bail!(
                        "all dependencies must have a version specified when publishing.\n\
                         dependency `{name}` does not specify a version"
                    );
                };
                let (optional, default_features, features, registry, renamed) = match dep {
                    TomlDependency::Simple(_) => (false, true, Vec::new(), None, None),
                    TomlDependency::Detailed(d) => (
                        d.optional.unwrap_or(false),
                        d.default_features.unwrap_or(true),
                        d.features.clone(),
                        d.registry.clone(),
                        d.package.as_ref().map(|_| key.clone()),
                    ),
                };
                deps.push(NewPackageDependency {
                    optional,
                    default_features,
                    name: name.to_string(),
                    features,
                    version_req: version_req.to_string(),
                    target: target.map(str::to_string),
                    kind: match kind {
                        DepKind::Normal => "normal",
                        DepKind::Development => "dev",
                        DepKind::Build => "build",
                    }
                    .to_string(),
                    registry,
                    explicit_name_in_toml: renamed,
                });
            }
            Ok(())
        };

    push_table(&manifest.dependencies, DepKind::Normal, None)?;
    push_table(&manifest.dev_dependencies, DepKind::Development, None)?;
    push_table(&manifest.build_dependencies, DepKind::Build, None)?;
    for (target, platform) in &manifest.target {
        push_table(&platform.dependencies, DepKind::Normal, Some(target))?;
        push_table(
            &platform.dev_dependencies,
            DepKind::Development,
            Some(target),
        )?;
        push_table(&platform.build_dependencies, DepKind::Build, Some(target))?;
    }

    Ok(NewPackage {
        name: toml.name.clone(),
        vers: toml.version.to_string(),
        deps,
        features: BTreeMap::new(),
        authors: Vec::new(),
        description: toml.description.clone(),
        documentation: toml.documentation.clone(),
        homepage: toml.homepage.clone(),
        readme: None,
        keywords: toml.keywords.clone(),
        categories: Vec::new(),
        license: toml.license.clone(),
        license_file: None,
        repository: toml.repository.clone(),
    })
}

/// Creates `target/package/<name>-<version>.pkg`, a gzipped tarball of the
/// package directory.
fn package_tarball(ws: &Workspace<'_>, package: &Package) -> HoistResult<PathBuf> {
    let name = package.name()?;
    let version = package.version()?;
    let prefix = format!("{name}-{version}");

    let dst_dir = ws.target_dir().join("package");
    paths::create_dir_all(&dst_dir)?;
    let dst = dst_dir.join(format!("{prefix}.pkg"));

    let file = File::create(&dst)
        .with_context(|| format!("failed to create `{}`", dst.display()))?;
    let encoder = GzEncoder::new(file, Compression::best());
    let mut builder = tar::Builder::new(encoder);

    let root = package.root();
    let target_dir = ws.target_dir();
    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let path = e.path();
            e.depth() == 0 || (path != target_dir && !is_hidden(path))
        })
    {
        let entry = entry.with_context(|| format!("failed to walk `{}`", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap();
        builder
            .append_path_with_name(path, PathBuf::from(&prefix).join(rel))
            .with_context(|| format!("failed to archive `{}`", path.display()))?;
    }

    let encoder = builder.into_inner().context("failed to finish archive")?;
    encoder.finish().context("failed to finish archive")?;
    Ok(dst)
}

fn is_hidden(path: &std::path::Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
