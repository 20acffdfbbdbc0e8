use std::io::IsTerminal as _;
use std::io::Read as _;

use anyhow::Context as _;

use crate::drop_eprintln;
use crate::ops::registry::{api_host, RegistryOrIndex};
use crate::util::auth::{self, Secret};
use crate::util::config::DEFAULT_REGISTRY;
use crate::util::{Config, HoistResult};

/// Saves an API token for a registry.
pub fn registry_login(
    config: &Config,
    token: Option<Secret<String>>,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<()> {
    let name = match reg_or_index {
        Some(RegistryOrIndex::Index(_)) => {
            anyhow::bail!("`hoist login` cannot store a token for a raw `--index` url, use `--registry` instead")
        }
        Some(RegistryOrIndex::Registry(name)) => name.as_str(),
        None => DEFAULT_REGISTRY,
    };

    let token = match token {
        Some(token) => token,
        None => {
            let host = api_host(config, reg_or_index)?;
            if std::io::stdin().is_terminal() {
                drop_eprintln!(
                    config,
                    "please paste the token found on {host}me below"
                );
            }
            let mut line = String::new();
            std::io::stdin()
                .read_to_string(&mut line)
                .context("failed to read token from stdin")?;
            Secret::from(line.trim().to_string())
        }
    };

    auth::login(config, Some(name), token)?;
    config
        .shell()
        .status("Login", format!("token for `{name}` saved"))?;
    Ok(())
}
