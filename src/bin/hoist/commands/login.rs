use hoist::ops;
use hoist::util::auth::Secret;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("login")
        .about("Save an API token from the registry locally")
        .arg(
            Arg::new("token")
                .value_name("TOKEN")
                .help("Token to save; read from stdin if not provided"),
        )
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let token = args
        .get_string("token")
        .map(|t| Secret::from(t.clone()));
    let reg_or_index = args.registry_or_index()?;
    ops::registry_login(config, token, reg_or_index.as_ref())?;
    Ok(())
}
