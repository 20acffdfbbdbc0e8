use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("logout")
        .about("Remove an API token from the registry locally")
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let reg_or_index = args.registry_or_index()?;
    ops::registry_logout(config, reg_or_index.as_ref())?;
    Ok(())
}
