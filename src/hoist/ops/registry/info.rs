use anyhow::Context as _;

use crate::core::PackageIdSpec;
use crate::drop_println;
use crate::ops::registry::{registry, RegistryOrIndex};
use crate::util::style::{HEADER, LITERAL, NOTE, WARN};
use crate::util::{Config, HoistResult};

/// Displays registry metadata about a package.
pub fn info(
    spec: &PackageIdSpec,
    config: &Config,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<()> {
    if spec.source().is_some() {
        anyhow::bail!(
            "`hoist info` takes a plain `name[@version]` spec; \
             pass `--registry` or `--index` to pick the registry"
        );
    }

    let mut registry = registry(config, None, reg_or_index, false)?;
    let info = registry
        .package_info(spec.name())
        .with_context(|| format!("failed to look up `{}` on `{}`", spec.name(), registry.host()))?;

    // Pick the newest version matching the spec, or the registry's idea of
    // the latest one.
    let version = match spec.version() {
        Some(requested) => {
            let mut matching: Vec<semver::Version> = info
                .versions
                .iter()
                .filter(|v| !v.yanked)
                .filter_map(|v| v.num.parse().ok())
                .filter(|v| requested.matches(v))
                .collect();
            matching.sort();
            matching
                .pop()
                .map(|v| v.to_string())
                .ok_or_else(|| {
                    anyhow::format_err!(
                        "`{}` has no version matching `{requested}`",
                        spec.name()
                    )
                })?
        }
        None => info.package.max_version.clone(),
    };

    let package = &info.package;
    let header = HEADER.render();
    let literal = LITERAL.render();
    let note = NOTE.render();
    let warn = WARN.render();
    let reset = anstyle::Reset.render();

    drop_println!(config, "{header}{}{reset} {note}#{version}{reset}", package.name);
    if let Some(description) = &package.description {
        drop_println!(config, "{}", description.trim());
    }
    if let Some(license) = &package.license {
        drop_println!(config, "{literal}license:{reset} {license}");
    }
    if let Some(homepage) = &package.homepage {
        drop_println!(config, "{literal}homepage:{reset} {homepage}");
    }
    if let Some(repository) = &package.repository {
        drop_println!(config, "{literal}repository:{reset} {repository}");
    }
    if let Some(documentation) = &package.documentation {
        drop_println!(config, "{literal}documentation:{reset} {documentation}");
    }
    if !package.keywords.is_empty() {
        drop_println!(config, "{literal}keywords:{reset} {}", package.keywords.join(", "));
    }

    // Owners require a token on some registries; skip the line when none is
    // stored rather than failing an otherwise anonymous lookup.
    match registry.list_owners(spec.name()) {
        Ok(owners) if !owners.is_empty() => {
            let logins: Vec<&str> = owners.iter().map(|o| o.login.as_str()).collect();
            drop_println!(config, "{literal}owners:{reset} {}", logins.join(", "));
        }
        Ok(_) | Err(registry_api::Error::MissingToken) => {}
        Err(err) => {
            return Err(anyhow::Error::new(err).context(format!(
                "failed to list owners of `{}` on `{}`",
                spec.name(),
                registry.host()
            )));
        }
    }

    let yanked = info.versions.iter().filter(|v| v.yanked).count();
    let available = info.versions.len() - yanked;
    match yanked {
        0 => drop_println!(config, "{literal}versions:{reset} {available}"),
        _ => drop_println!(
            config,
            "{literal}versions:{reset} {available} {warn}({yanked} yanked){reset}"
        ),
    }

    config.shell().verbose(|shell| {
        shell.status(
            "Info",
            format!("fetched from {}", registry.host()),
        )
    })?;

    Ok(())
}
