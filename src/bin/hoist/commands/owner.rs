use hoist::ops::{self, OwnersOptions};
use hoist::util::auth::Secret;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("owner")
        .about("Manage the owners of a package on the registry")
        .arg(
            Arg::new("package")
                .value_name("PACKAGE")
                .help("Package to modify; defaults to the current package"),
        )
        ._arg(
            multi_opt("add", "LOGIN", "Login of a user to invite as an owner").short('a'),
        )
        ._arg(
            multi_opt("remove", "LOGIN", "Login of a user to remove as an owner").short('r'),
        )
        ._arg(flag("list", "List owners of a package").short('l'))
        ._arg(opt("token", "API token to use when authenticating").value_name("TOKEN"))
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let opts = OwnersOptions {
        package: args.get_string("package").cloned(),
        token: args.get_string("token").map(|t| Secret::from(t.clone())),
        reg_or_index: args.registry_or_index()?,
        to_add: values(args, "add"),
        to_remove: values(args, "remove"),
        list: args.flag("list"),
    };
    if opts.to_add.is_empty() && opts.to_remove.is_empty() && !opts.list {
        return Err(anyhow::format_err!(
            "option --add, --remove, or --list must be given"
        )
        .into());
    }
    ops::modify_owners(config, opts)?;
    Ok(())
}
