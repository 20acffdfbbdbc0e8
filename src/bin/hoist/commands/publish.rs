use hoist::ops::{self, PublishOpts};
use hoist::util::auth::Secret;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("publish")
        .about("Package and upload this package to the registry")
        .arg_dry_run("Perform all checks and package without uploading")
        ._arg(opt("token", "API token to use when authenticating").value_name("TOKEN"))
        .arg_registry("Registry to publish to")
        .arg_index("Registry index URL to publish to")
        .arg_package("Package to publish")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let package = ws.select_package(args.get_string("package").map(String::as_str))?;
    let opts = PublishOpts {
        token: args.get_string("token").map(|t| Secret::from(t.clone())),
        reg_or_index: args.registry_or_index()?,
        dry_run: args.dry_run(),
    };
    ops::publish(&ws, package, opts)?;
    Ok(())
}
