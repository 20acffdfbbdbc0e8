use hoist::ops::{self, DocOptions};
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("rustdoc")
        .about("Build a package's documentation, using rustdoc directly")
        .arg(
            Arg::new("args")
                .value_name("ARGS")
                .num_args(0..)
                .last(true)
                .help("Extra flags passed directly to rustdoc"),
        )
        ._arg(flag("open", "Open the docs in a browser after building them"))
        .arg_package("Package to document")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let package = ws.select_package(args.get_string("package").map(String::as_str))?;
    let options = DocOptions {
        open_result: args.flag("open"),
        args: values(args, "args"),
    };
    ops::doc(&ws, package, &options)?;
    Ok(())
}
