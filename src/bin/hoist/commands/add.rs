use std::collections::BTreeSet;

use hoist::core::dependency::DepKind;
use hoist::ops::{self, AddOptions, DepOp};
use hoist::util::command_prelude::*;
use hoist::util::toml_mut::manifest::DepTable;

pub fn cli() -> Command {
    subcommand("add")
        .about("Add dependencies to a Hoist.toml manifest file")
        .arg(
            Arg::new("crates")
                .value_name("DEP_ID")
                .num_args(1..)
                .required(true)
                .help("Reference to a package to add as a dependency, as `name` or `name@version`"),
        )
        .arg_dry_run("Don't actually write the manifest")
        ._arg(
            flag("dev", "Add as a development dependency")
                .conflicts_with("build"),
        )
        ._arg(flag("build", "Add as a build dependency"))
        ._arg(
            opt("rename", "Rename the dependency")
                .value_name("NAME"),
        )
        ._arg(
            opt("path", "Filesystem path to a local package")
                .value_name("PATH"),
        )
        ._arg(
            multi_opt(
                "features",
                "FEATURES",
                "Comma or space separated list of features to activate",
            )
            .short('F'),
        )
        ._arg(flag("no-default-features", "Disable the default features"))
        ._arg(flag("optional", "Mark the dependency as optional"))
        ._arg(
            opt("target", "Add as a dependency to the given target platform")
                .value_name("TARGET"),
        )
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
        .arg_package("Package to modify")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let package = ws.select_package(args.get_string("package").map(String::as_str))?;

    let crates = values(args, "crates");
    let path = args.get_string("path").cloned();
    let rename = args.get_string("rename").cloned();
    if crates.len() > 1 && path.is_some() {
        return Err(
            anyhow::format_err!("--path can only be used when adding a single dependency").into(),
        );
    }
    if crates.len() > 1 && rename.is_some() {
        return Err(
            anyhow::format_err!("--rename can only be used when adding a single dependency")
                .into(),
        );
    }

    let features = parse_features(&values(args, "features"));
    let mut section = if args.flag("dev") {
        DepTable::new(DepKind::Development)
    } else if args.flag("build") {
        DepTable::new(DepKind::Build)
    } else {
        DepTable::new(DepKind::Normal)
    };
    if let Some(target) = args.get_string("target") {
        section = section.set_target(target.as_str());
    }

    let deps = crates
        .into_iter()
        .map(|spec| DepOp {
            spec,
            rename: rename.clone(),
            features: features.clone(),
            default_features: args.flag("no-default-features").then_some(false),
            optional: args.flag("optional").then_some(true),
            path: path.clone(),
        })
        .collect();

    let options = AddOptions {
        deps,
        section,
        dry_run: args.dry_run(),
        reg_or_index: args.registry_or_index()?,
    };
    ops::add(&ws, package, &options)?;
    Ok(())
}

fn parse_features(raw: &[String]) -> Option<BTreeSet<String>> {
    let features: BTreeSet<String> = raw
        .iter()
        .flat_map(|s| s.split([',', ' ']))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!features.is_empty()).then_some(features)
}
