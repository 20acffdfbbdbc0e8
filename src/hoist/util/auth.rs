//! Registry authentication and credential storage.
//!
//! Tokens live in `$HOIST_HOME/credentials.toml`, one `[registries.<name>]`
//! table per registry. The file is chmod 0600 on unix since it holds
//! secrets.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Context as _};
use serde::{Deserialize, Serialize};

use crate::util::config::DEFAULT_REGISTRY;
use crate::util::errors::HoistResult;
use crate::util::paths;
use crate::Config;

/// A wrapper for values that should not be printed.
///
/// Does not implement `Display`, and `Debug` hides the inner value, so a
/// secret cannot leak into logs or error chains by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    pub fn from(inner: T) -> Secret<T> {
        Secret { inner }
    }

    /// Unwraps the inner value. Use sparingly, at the point the secret is
    /// actually sent somewhere.
    pub fn expose(self) -> T {
        self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret {{ inner: \"REDACTED\" }}")
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Credentials {
    #[serde(default)]
    registries: BTreeMap<String, RegistryCredential>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RegistryCredential {
    token: String,
}

fn load(config: &Config) -> HoistResult<Credentials> {
    let path = config.credentials_path();
    if !path.exists() {
        return Ok(Credentials::default());
    }
    let contents = paths::read(&path)?;
    toml::from_str(&contents)
        .with_context(|| format!("could not parse credentials at `{}`", path.display()))
}

fn store(config: &Config, credentials: &Credentials) -> HoistResult<()> {
    let path = config.credentials_path();
    paths::create_dir_all(config.home())?;
    let contents = toml::to_string_pretty(credentials)
        .context("failed to serialize credentials")?;
    paths::write_atomic(&path, contents)?;
    set_permissions(&path)?;
    Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &std::path::Path) -> HoistResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to set permissions of `{}`", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_permissions(_path: &std::path::Path) -> HoistResult<()> {
    Ok(())
}

/// Returns the stored token for a registry, if any.
pub fn registry_token(config: &Config, registry: Option<&str>) -> HoistResult<Option<Secret<String>>> {
    let registry = registry.unwrap_or(DEFAULT_REGISTRY);
    let credentials = load(config)?;
    Ok(credentials
        .registries
        .get(registry)
        .map(|c| Secret::from(c.token.clone())))
}

/// Returns the stored token for a registry, or an actionable error.
pub fn registry_token_required(
    config: &Config,
    registry: Option<&str>,
) -> HoistResult<Secret<String>> {
    let name = registry.unwrap_or(DEFAULT_REGISTRY);
    match registry_token(config, registry)? {
        Some(token) => Ok(token),
        None => bail!(
            "no token found for `{name}`, \
             please run `hoist login{}`",
            if name == DEFAULT_REGISTRY {
                String::new()
            } else {
                format!(" --registry {name}")
            }
        ),
    }
}

/// Saves a token for a registry.
pub fn login(config: &Config, registry: Option<&str>, token: Secret<String>) -> HoistResult<()> {
    let registry = registry.unwrap_or(DEFAULT_REGISTRY);
    let token = token.expose();
    if token.is_empty() {
        bail!("please provide a non-empty token");
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        bail!("token contains invalid characters; only printable ASCII is allowed");
    }
    let mut credentials = load(config)?;
    credentials
        .registries
        .insert(registry.to_string(), RegistryCredential { token });
    store(config, &credentials)
}

/// Removes the token for a registry. Returns `true` if one was stored.
pub fn logout(config: &Config, registry: Option<&str>) -> HoistResult<bool> {
    let registry = registry.unwrap_or(DEFAULT_REGISTRY);
    let mut credentials = load(config)?;
    if credentials.registries.remove(registry).is_none() {
        return Ok(false);
    }
    store(config, &credentials)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shell::Shell;

    fn test_config(home: &std::path::Path) -> Config {
        Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            home.to_path_buf(),
            home.to_path_buf(),
        )
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        assert!(registry_token(&config, None).unwrap().is_none());
        login(&config, None, Secret::from("s3kr1t".to_string())).unwrap();
        let token = registry_token(&config, None).unwrap().unwrap();
        assert_eq!(token.expose(), "s3kr1t");

        // A named registry gets its own slot.
        login(&config, Some("mirror"), Secret::from("other".to_string())).unwrap();
        assert_eq!(
            registry_token(&config, Some("mirror"))
                .unwrap()
                .unwrap()
                .expose(),
            "other"
        );

        assert!(logout(&config, None).unwrap());
        assert!(!logout(&config, None).unwrap());
        assert!(registry_token(&config, None).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        assert!(login(&config, None, Secret::from(String::new())).is_err());
        assert!(login(&config, None, Secret::from("a b".to_string())).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn credentials_are_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        login(&config, None, Secret::from("tok".to_string())).unwrap();
        let meta = std::fs::metadata(config.credentials_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::from("tok".to_string());
        assert!(!format!("{secret:?}").contains("tok"));
    }
}
