//! Removes binaries installed into `$HOIST_HOME/bin`.
//!
//! Installed packages are recorded in `$HOIST_HOME/tracker.toml`:
//!
//! ```toml
//! [v1]
//! "ripgrep 13.0.0 (registry+https://hoisthub.io/)" = ["rg"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context as _};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{PackageId, PackageIdSpec};
use crate::util::edit_distance::closest_msg;
use crate::util::{paths, Config, HoistResult};

/// The on-disk record of installed packages and their binaries.
#[derive(Debug, Default)]
pub struct InstallTracker {
    entries: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EncodableTracker {
    #[serde(default)]
    v1: BTreeMap<String, Vec<String>>,
}

impl InstallTracker {
    pub fn load(path: &Path) -> HoistResult<InstallTracker> {
        if !path.exists() {
            return Ok(InstallTracker::default());
        }
        let contents = paths::read(path)?;
        let encodable: EncodableTracker = toml::from_str(&contents)
            .with_context(|| format!("failed to parse tracker at `{}`", path.display()))?;
        Ok(InstallTracker {
            entries: encodable.v1,
        })
    }

    pub fn save(&self, path: &Path) -> HoistResult<()> {
        if let Some(parent) = path.parent() {
            paths::create_dir_all(parent)?;
        }
        let encodable = EncodableTracker {
            v1: self.entries.clone(),
        };
        let contents =
            toml::to_string(&encodable).context("failed to serialize install tracker")?;
        paths::write_atomic(path, contents)
    }

    /// All tracked package IDs.
    pub fn package_ids(&self) -> HoistResult<Vec<PackageId>> {
        self.entries.keys().map(|key| parse_key(key)).collect()
    }

    pub fn bins(&self, id: &PackageId) -> &[String] {
        self.entries
            .get(&id.stable_key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn remove_bins(&mut self, id: &PackageId, bins: &[String]) {
        let key = id.stable_key();
        if let Some(tracked) = self.entries.get_mut(&key) {
            tracked.retain(|b| !bins.contains(b));
            if tracked.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a tracker key of the form `name version (source)`.
fn parse_key(key: &str) -> HoistResult<PackageId> {
    let mut parts = key.splitn(3, ' ');
    let invalid = || anyhow::format_err!("invalid tracker entry `{key}`");
    let name = parts.next().ok_or_else(invalid)?;
    let version = parts
        .next()
        .ok_or_else(invalid)?
        .parse::<Version>()
        .map_err(|_| invalid())?;
    let source = parts
        .next()
        .and_then(|s| s.strip_prefix('('))
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;
    Ok(PackageId::new(name, version, source))
}

/// Uninstalls one or more installed packages.
///
/// With `bins` non-empty, only those binaries are deleted and the package
/// stays tracked while it has binaries left.
pub fn uninstall(
    config: &Config,
    root: Option<String>,
    specs: Vec<String>,
    bins: Vec<String>,
) -> HoistResult<()> {
    if specs.len() > 1 && !bins.is_empty() {
        bail!("A binary can only be associated with a single installed package, specifying multiple specs with --bin is not supported.");
    }
    if specs.is_empty() {
        bail!("must specify at least one package to uninstall");
    }

    let root = root.map(|r| config.cwd().join(r));
    let (bin_dir, tracker_path) = match &root {
        Some(root) => (root.join("bin"), root.join("tracker.toml")),
        None => (config.bin_dir(), config.tracker_path()),
    };
    let mut tracker = InstallTracker::load(&tracker_path)?;

    let mut summary = Vec::new();
    for spec in &specs {
        if let Err(error) = uninstall_one(config, &mut tracker, &bin_dir, spec, &bins) {
            summary.push((spec.clone(), error));
        }
    }
    tracker.save(&tracker_path)?;

    match summary.len() {
        0 => Ok(()),
        1 => {
            let (_, error) = summary.into_iter().next().expect("one error");
            Err(error)
        }
        _ => {
            for (spec, error) in &summary {
                config.shell().error(format!("`{spec}`: {error:#}"))?;
            }
            bail!("some packages failed to uninstall")
        }
    }
}

fn uninstall_one(
    config: &Config,
    tracker: &mut InstallTracker,
    bin_dir: &Path,
    spec: &str,
    only_bins: &[String],
) -> HoistResult<()> {
    let spec = PackageIdSpec::parse(spec)?;
    let installed = tracker.package_ids()?;
    let id = match installed.iter().find(|id| spec.matches(id)) {
        Some(id) => id.clone(),
        None => {
            let suggestion = closest_msg(spec.name(), installed.iter(), |id| id.name());
            bail!("package `{spec}` is not installed{suggestion}")
        }
    };

    let tracked = tracker.bins(&id).to_vec();
    let to_remove: Vec<String> = if only_bins.is_empty() {
        tracked.clone()
    } else {
        for bin in only_bins {
            if !tracked.contains(bin) {
                bail!("binary `{bin}` not installed as part of `{id}`");
            }
        }
        only_bins.to_vec()
    };

    for bin in &to_remove {
        let path = bin_dir.join(exe(bin));
        config
            .shell()
            .status("Removing", format!("{}", path.display()))?;
        if path.exists() {
            paths::remove_file(&path)?;
        }
    }
    tracker.remove_bins(&id, &to_remove);
    Ok(())
}

fn exe(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Shell;

    fn test_config(home: &Path) -> Config {
        Config::new(
            Shell::from_write(Box::new(Vec::<u8>::new())),
            home.to_path_buf(),
            home.to_path_buf(),
        )
    }

    fn install_fixture(config: &Config) {
        std::fs::create_dir_all(config.bin_dir()).unwrap();
        for bin in ["rg", "rg-helper"] {
            std::fs::write(config.bin_dir().join(exe(bin)), "#!/bin/sh").unwrap();
        }
        std::fs::write(
            config.tracker_path(),
            "[v1]\n\"ripgrep 13.0.0 (registry+https://hoisthub.io/)\" = [\"rg\", \"rg-helper\"]\n",
        )
        .unwrap();
    }

    #[test]
    fn uninstall_removes_bins_and_tracker_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        install_fixture(&config);

        uninstall(&config, None, vec!["ripgrep".to_string()], vec![]).unwrap();
        assert!(!config.bin_dir().join(exe("rg")).exists());
        assert!(!config.bin_dir().join(exe("rg-helper")).exists());
        assert!(InstallTracker::load(&config.tracker_path()).unwrap().is_empty());
    }

    #[test]
    fn uninstall_single_bin_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        install_fixture(&config);

        uninstall(
            &config,
            None,
            vec!["ripgrep@13".to_string()],
            vec!["rg-helper".to_string()],
        )
        .unwrap();
        assert!(config.bin_dir().join(exe("rg")).exists());
        assert!(!config.bin_dir().join(exe("rg-helper")).exists());

        let tracker = InstallTracker::load(&config.tracker_path()).unwrap();
        assert!(!tracker.is_empty());
    }

    #[test]
    fn root_overrides_the_install_directory() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        let config = test_config(&home);

        let root = dir.path().join("elsewhere");
        std::fs::create_dir_all(root.join("bin")).unwrap();
        std::fs::write(root.join("bin").join(exe("rg")), "#!/bin/sh").unwrap();
        std::fs::write(
            root.join("tracker.toml"),
            "[v1]\n\"ripgrep 13.0.0 (registry+https://hoisthub.io/)\" = [\"rg\"]\n",
        )
        .unwrap();

        uninstall(
            &config,
            Some(root.display().to_string()),
            vec!["ripgrep".to_string()],
            vec![],
        )
        .unwrap();
        assert!(!root.join("bin").join(exe("rg")).exists());
        assert!(InstallTracker::load(&root.join("tracker.toml")).unwrap().is_empty());
    }

    #[test]
    fn unknown_package_suggests_an_alternative() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        install_fixture(&config);

        let err = uninstall(&config, None, vec!["ripgrp".to_string()], vec![]).unwrap_err();
        assert!(err.to_string().contains("is not installed"));
        assert!(err.to_string().contains("Did you mean `ripgrep`?"));
    }
}
