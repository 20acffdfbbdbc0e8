use hoist::core::dependency::DepKind;
use hoist::ops::{self, RemoveOptions};
use hoist::util::command_prelude::*;
use hoist::util::toml_mut::manifest::DepTable;

pub fn cli() -> Command {
    subcommand("remove")
        .about("Remove dependencies from a Hoist.toml manifest file")
        .arg(
            Arg::new("dependencies")
                .value_name("DEP_ID")
                .num_args(1..)
                .required(true)
                .help("Dependencies to be removed"),
        )
        .arg_dry_run("Don't actually write the manifest")
        ._arg(
            flag("dev", "Remove from dev-dependencies")
                .conflicts_with("build"),
        )
        ._arg(flag("build", "Remove from build-dependencies"))
        ._arg(
            opt("target", "Remove from the given target platform's table")
                .value_name("TARGET"),
        )
        .arg_package("Package to modify")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let package = ws.select_package(args.get_string("package").map(String::as_str))?;

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

    let options = RemoveOptions {
        deps: values(args, "dependencies"),
        section,
        dry_run: args.dry_run(),
    };
    ops::remove(&ws, package, &options)?;
    Ok(())
}
