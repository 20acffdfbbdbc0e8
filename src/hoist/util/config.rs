//! Global configuration for a `hoist` invocation.
//!
//! Configuration is layered: defaults, then `$HOIST_HOME/config.toml`, then
//! environment variables and command-line flags. The `Config` is created
//! once at startup and threaded through every operation.

use std::cell::{OnceCell, RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context as _};
use serde::Deserialize;
use url::Url;

use crate::core::shell::{Shell, Verbosity};
use crate::util::errors::HoistResult;
use crate::util::paths;

/// Name of the default registry.
pub const DEFAULT_REGISTRY: &str = "hoisthub";
/// API host of the default registry.
pub const DEFAULT_REGISTRY_API: &str = "https://hoisthub.io";

/// Configuration information for hoist. This is not specific to a build, it
/// is information relating to hoist itself.
#[derive(Debug)]
pub struct Config {
    /// The location of the user's hoist home directory. OS-dependent.
    home_path: PathBuf,
    /// Information about how to write messages to the shell.
    shell: RefCell<Shell>,
    /// The current working directory of hoist.
    cwd: PathBuf,
    /// Parsed contents of `$HOIST_HOME/config.toml`, loaded lazily.
    values: OnceCell<ConfigValues>,
    /// `--frozen` flag.
    frozen: bool,
    /// `--locked` flag.
    locked: bool,
    /// `--offline` flag.
    offline: bool,
    /// Extra verbosity (`-vv`).
    extra_verbose: bool,
}

impl Config {
    /// Creates a new config instance, with all default settings.
    pub fn new(shell: Shell, cwd: PathBuf, home_path: PathBuf) -> Config {
        Config {
            home_path,
            shell: RefCell::new(shell),
            cwd,
            values: OnceCell::new(),
            frozen: false,
            locked: false,
            offline: false,
            extra_verbose: false,
        }
    }

    /// Creates a configuration based on the process environment.
    pub fn default() -> HoistResult<Config> {
        let shell = Shell::new();
        let cwd = std::env::current_dir()
            .context("couldn't get the current directory of the process")?;
        let homedir = homedir(&cwd).ok_or_else(|| {
            anyhow!(
                "could not find hoist home directory. \
                 Define the HOIST_HOME environment variable \
                 or ensure your home directory is located correctly"
            )
        })?;
        Ok(Config::new(shell, cwd, homedir))
    }

    /// Gets a reference to the shell, e.g., for writing error messages.
    pub fn shell(&self) -> RefMut<'_, Shell> {
        self.shell.borrow_mut()
    }

    /// Gets the user's hoist home directory (`$HOIST_HOME`).
    pub fn home(&self) -> &Path {
        &self.home_path
    }

    /// The current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Path to the `config.toml` file.
    pub fn config_path(&self) -> PathBuf {
        self.home_path.join("config.toml")
    }

    /// Path to the `credentials.toml` file.
    pub fn credentials_path(&self) -> PathBuf {
        self.home_path.join("credentials.toml")
    }

    /// Directory where downloaded package archives are cached.
    pub fn cache_dir(&self) -> PathBuf {
        self.home_path.join("cache")
    }

    /// Directory where installed binaries live.
    pub fn bin_dir(&self) -> PathBuf {
        self.home_path.join("bin")
    }

    /// Path to the installed-binary tracker file.
    pub fn tracker_path(&self) -> PathBuf {
        self.home_path.join("tracker.toml")
    }

    /// Applies the command-line flag overrides.
    pub fn configure(
        &mut self,
        verbose: u32,
        quiet: bool,
        color: Option<&str>,
        frozen: bool,
        locked: bool,
        offline: bool,
    ) -> HoistResult<()> {
        let extra_verbose = verbose >= 2;
        let verbose = verbose != 0;

        let verbosity = match (verbose, quiet) {
            (true, true) => bail!("cannot set both --verbose and --quiet"),
            (true, false) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        };

        let mut shell = self.shell.borrow_mut();
        shell.set_verbosity(verbosity);
        shell.set_color_choice(color)?;
        drop(shell);

        self.frozen = frozen;
        self.locked = locked;
        self.offline = offline;
        self.extra_verbose = extra_verbose;
        Ok(())
    }

    pub fn extra_verbose(&self) -> bool {
        self.extra_verbose
    }

    pub fn frozen(&self) -> bool {
        self.frozen
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    /// If `false`, hoist cannot touch the network.
    pub fn network_allowed(&self) -> bool {
        !self.frozen && !self.offline
    }

    /// If `false`, hoist may not write a changed lockfile.
    pub fn lock_update_allowed(&self) -> bool {
        !self.frozen && !self.locked
    }

    /// Looks up an environment variable as a string.
    pub fn get_env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn values(&self) -> HoistResult<&ConfigValues> {
        if let Some(values) = self.values.get() {
            return Ok(values);
        }
        let path = self.config_path();
        let values = if path.exists() {
            let contents = paths::read(&path)?;
            toml::from_str(&contents)
                .with_context(|| format!("could not parse config at `{}`", path.display()))?
        } else {
            ConfigValues::default()
        };
        Ok(self.values.get_or_init(|| values))
    }

    /// Looks up a command alias from the `[alias]` table.
    pub fn alias(&self, name: &str) -> HoistResult<Option<Vec<String>>> {
        let values = self.values()?;
        Ok(values.alias.get(name).map(|v| match v {
            StringOrVec::String(s) => s.split_whitespace().map(str::to_string).collect(),
            StringOrVec::Vec(v) => v.clone(),
        }))
    }

    /// All user-defined aliases.
    pub fn aliases(&self) -> HoistResult<BTreeMap<String, Vec<String>>> {
        let values = self.values()?;
        Ok(values
            .alias
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    StringOrVec::String(s) => {
                        s.split_whitespace().map(str::to_string).collect()
                    }
                    StringOrVec::Vec(v) => v.clone(),
                };
                (k.clone(), v)
            })
            .collect())
    }

    /// The `[http]` table.
    pub fn http_config(&self) -> HoistResult<HttpConfig> {
        Ok(self.values()?.http.clone())
    }

    /// Resolves a registry name to its API host.
    ///
    /// `None` selects the default registry, honoring a `[registry] api`
    /// override from the config file.
    pub fn registry_api(&self, name: Option<&str>) -> HoistResult<Url> {
        let values = self.values()?;
        let raw = match name {
            None | Some(DEFAULT_REGISTRY) => values
                .registry
                .api
                .clone()
                .unwrap_or_else(|| DEFAULT_REGISTRY_API.to_string()),
            Some(name) => match values.registries.get(name) {
                Some(entry) => entry.api.clone(),
                None => bail!(
                    "no registry named `{name}` is configured; \
                     add `[registries.{name}] api = \"...\"` to `{}`",
                    self.config_path().display()
                ),
            },
        };
        Url::parse(&raw).with_context(|| format!("invalid registry api url `{raw}`"))
    }
}

/// Finds the hoist home directory: `$HOIST_HOME` if set, otherwise
/// `~/.hoist`.
fn homedir(cwd: &Path) -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOIST_HOME") {
        let home = PathBuf::from(home);
        if home.is_absolute() {
            return Some(home);
        }
        return Some(cwd.join(home));
    }
    home::home_dir().map(|p| p.join(".hoist"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigValues {
    #[serde(default)]
    alias: BTreeMap<String, StringOrVec>,
    #[serde(default)]
    http: HttpConfig,
    #[serde(default)]
    registry: RegistryTable,
    #[serde(default)]
    registries: BTreeMap<String, RegistryEntry>,
}

/// Configuration for the `[http]` table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Timeout in seconds. Also settable via the `HTTP_TIMEOUT` env var.
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
    pub low_speed_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegistryTable {
    /// Overrides the API host of the default registry.
    api: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegistryEntry {
    api: String,
}

/// A value that can be deserialized from a single string or a list of
/// strings, used for `[alias]` entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    String(String),
    Vec(Vec<String>),
}
