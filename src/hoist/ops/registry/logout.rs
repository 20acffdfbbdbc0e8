use crate::ops::registry::RegistryOrIndex;
use crate::util::auth;
use crate::util::config::DEFAULT_REGISTRY;
use crate::util::{Config, HoistResult};

/// Removes the stored API token for a registry.
pub fn registry_logout(
    config: &Config,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<()> {
    let name = match reg_or_index {
        Some(RegistryOrIndex::Index(_)) => {
            anyhow::bail!("`hoist logout` takes a `--registry` name, not an `--index` url")
        }
        Some(RegistryOrIndex::Registry(name)) => name.as_str(),
        None => DEFAULT_REGISTRY,
    };

    if auth::logout(config, Some(name))? {
        config.shell().status(
            "Logout",
            format!("token for `{name}` has been removed from local storage"),
        )?;
    } else {
        config
            .shell()
            .status("Logout", format!("not currently logged in to `{name}`"))?;
    }
    Ok(())
}
