use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("fetch")
        .about("Fetch the packages named in Hoist.lock into the local cache")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    ops::fetch(&ws)?;
    Ok(())
}
