use anyhow::Context as _;

use crate::core::Package;
use crate::drop_println;
use crate::ops::registry::{registry, RegistryOrIndex};
use crate::util::auth::Secret;
use crate::util::important_paths::find_root_manifest_for_wd;
use crate::util::{Config, HoistResult};

#[derive(Debug, Default)]
pub struct OwnersOptions {
    /// Package to modify; defaults to the package in the current directory.
    pub package: Option<String>,
    pub token: Option<Secret<String>>,
    pub reg_or_index: Option<RegistryOrIndex>,
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
    pub list: bool,
}

/// Lists, adds, or removes owners of a registry package.
pub fn modify_owners(config: &Config, opts: OwnersOptions) -> HoistResult<()> {
    let name = match &opts.package {
        Some(name) => name.clone(),
        None => {
            let manifest_path = find_root_manifest_for_wd(config.cwd())?;
            let package = Package::load(&manifest_path)?;
            package.name()?.to_string()
        }
    };

    let mut registry = registry(
        config,
        opts.token,
        opts.reg_or_index.as_ref(),
        // Listing owners needs no token.
        !opts.to_add.is_empty() || !opts.to_remove.is_empty(),
    )?;

    if !opts.to_add.is_empty() {
        let owners = opts.to_add.iter().map(String::as_str).collect::<Vec<_>>();
        let msg = registry
            .add_owners(&name, &owners)
            .with_context(|| format!("failed to invite owners on `{}`", registry.host()))?;
        config.shell().status("Owner", msg)?;
    }

    if !opts.to_remove.is_empty() {
        let owners = opts.to_remove.iter().map(String::as_str).collect::<Vec<_>>();
        config.shell().status(
            "Owner",
            format!("removing {} from package `{name}`", owners.join(", ")),
        )?;
        registry
            .remove_owners(&name, &owners)
            .with_context(|| format!("failed to remove owners on `{}`", registry.host()))?;
    }

    if opts.list {
        let owners = registry
            .list_owners(&name)
            .with_context(|| format!("failed to list owners on `{}`", registry.host()))?;
        for owner in owners {
            match (owner.name.as_deref(), owner.email.as_deref()) {
                (Some(name), Some(email)) => {
                    drop_println!(config, "{} ({name} <{email}>)", owner.login)
                }
                (Some(detail), None) | (None, Some(detail)) => {
                    drop_println!(config, "{} ({detail})", owner.login)
                }
                (None, None) => drop_println!(config, "{}", owner.login),
            }
        }
    }

    Ok(())
}
