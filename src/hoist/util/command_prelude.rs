//! Helpers for building the command-line interface. Every subcommand module
//! glob-imports this.

use std::path::PathBuf;

use anyhow::bail;
use clap::builder::ValueParser;
use url::Url;

use crate::core::Workspace;
use crate::ops::RegistryOrIndex;
use crate::util::important_paths::find_root_manifest_for_wd;
use crate::util::paths::normalize_path;
use crate::util::HoistResult;

pub use crate::util::{CliError, CliResult, Config};
pub use clap::{Arg, ArgAction, ArgMatches, Command};

/// Creates a subcommand with the conventions every `hoist` subcommand shares.
pub fn subcommand(name: &'static str) -> Command {
    Command::new(name)
        .dont_collapse_args_in_usage(true)
        .disable_help_flag(true)
        .arg(
            flag("help", "Print help")
                .short('h')
                .action(ArgAction::Help)
                .global(true),
        )
}

/// Creates a boolean flag argument.
pub fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .action(ArgAction::SetTrue)
}

/// Creates an argument that takes a single value.
pub fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::Set)
}

/// Creates an option that may be specified multiple times.
pub fn multi_opt(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    opt(name, help)
        .value_name(value_name)
        .action(ArgAction::Append)
}

pub trait CommandExt: Sized {
    fn _arg(self, arg: Arg) -> Self;

    fn arg_manifest_path(self) -> Self {
        self._arg(
            opt("manifest-path", "Path to Hoist.toml")
                .value_name("PATH")
                .value_parser(ValueParser::path_buf()),
        )
    }

    fn arg_dry_run(self, help: &'static str) -> Self {
        self._arg(flag("dry-run", help).short('n'))
    }

    fn arg_package(self, help: &'static str) -> Self {
        self._arg(
            opt("package", help)
                .short('p')
                .value_name("SPEC"),
        )
    }

    fn arg_registry(self, help: &'static str) -> Self {
        self._arg(opt("registry", help).value_name("REGISTRY"))
    }

    fn arg_index(self, help: &'static str) -> Self {
        self._arg(
            opt("index", help)
                .value_name("URL")
                .conflicts_with("registry"),
        )
    }

    fn arg_jobs(self) -> Self {
        self._arg(
            opt("jobs", "Number of parallel jobs, defaults to 1")
                .short('j')
                .value_name("N"),
        )
    }
}

impl CommandExt for Command {
    fn _arg(self, arg: Arg) -> Command {
        self.arg(arg)
    }
}

pub trait ArgMatchesExt {
    fn flag(&self, name: &str) -> bool;

    fn get_string(&self, name: &str) -> Option<&String>;

    fn dry_run(&self) -> bool {
        self.flag("dry-run")
    }

    /// The `--jobs` argument, validated.
    fn jobs(&self) -> HoistResult<Option<u32>> {
        let Some(raw) = self.get_string("jobs") else {
            return Ok(None);
        };
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => bail!("--jobs must be a positive integer, but found `{raw}`"),
        }
    }

    /// The `--registry` or `--index` argument, if either was given.
    fn registry_or_index(&self) -> HoistResult<Option<RegistryOrIndex>> {
        if let Some(index) = self.get_string("index") {
            let url = Url::parse(index)
                .map_err(|e| anyhow::format_err!("invalid index url `{index}`: {e}"))?;
            return Ok(Some(RegistryOrIndex::Index(url)));
        }
        if let Some(registry) = self.get_string("registry") {
            return Ok(Some(RegistryOrIndex::Registry(registry.clone())));
        }
        Ok(None)
    }

    /// Locates the root manifest, honoring `--manifest-path`.
    fn root_manifest(&self, config: &Config) -> HoistResult<PathBuf>;

    /// Opens the workspace named by the manifest.
    fn workspace<'cfg>(&self, config: &'cfg Config) -> HoistResult<Workspace<'cfg>> {
        let manifest_path = self.root_manifest(config)?;
        Workspace::new(&manifest_path, config)
    }
}

impl ArgMatchesExt for ArgMatches {
    fn flag(&self, name: &str) -> bool {
        ignore_unknown(self.try_get_one::<bool>(name))
            .copied()
            .unwrap_or(false)
    }

    fn get_string(&self, name: &str) -> Option<&String> {
        ignore_unknown(self.try_get_one::<String>(name))
    }

    fn root_manifest(&self, config: &Config) -> HoistResult<PathBuf> {
        if let Some(path) = ignore_unknown(self.try_get_one::<PathBuf>("manifest-path")) {
            let path = normalize_path(&config.cwd().join(path));
            if !path.ends_with("Hoist.toml") {
                bail!("the manifest-path must be a path to a Hoist.toml file")
            }
            if !path.exists() {
                bail!("manifest path `{}` does not exist", path.display())
            }
            return Ok(path);
        }
        find_root_manifest_for_wd(config.cwd())
    }
}

/// Returns all string values of a multi-value argument.
pub fn values(args: &ArgMatches, name: &str) -> Vec<String> {
    match args.try_get_many::<String>(name) {
        Ok(Some(vals)) => vals.cloned().collect(),
        _ => Vec::new(),
    }
}

fn ignore_unknown<T>(r: Result<Option<T>, clap::parser::MatchesError>) -> Option<T> {
    match r {
        Ok(t) => t,
        Err(clap::parser::MatchesError::UnknownArgument { .. }) => None,
        Err(e) => {
            panic!("clap lookup failed: {e:?}")
        }
    }
}
