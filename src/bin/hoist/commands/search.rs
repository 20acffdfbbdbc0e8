use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("search")
        .about("Search packages in the registry")
        .arg(
            Arg::new("query")
                .value_name("QUERY")
                .num_args(1..)
                .required(true)
                .help("The thing to search for"),
        )
        ._arg(
            opt("limit", "Limit the number of results (default: 10, max: 100)")
                .value_name("LIMIT"),
        )
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let query = values(args, "query").join("+");
    let limit = match args.get_string("limit") {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            anyhow::format_err!("--limit must be a number, but found `{raw}`")
        })?,
        None => 10,
    };
    let reg_or_index = args.registry_or_index()?;
    ops::search(&query, config, limit, reg_or_index.as_ref())?;
    Ok(())
}
