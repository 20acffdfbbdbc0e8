use hoist::drop_println;
use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("pkgid")
        .about("Print a fully qualified package specification")
        .arg(
            Arg::new("spec")
                .value_name("SPEC")
                .help("Part of a package ID specification, e.g. `name@1.0`"),
        )
        .arg_package("Argument to get the package ID specifier for")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let spec = args
        .get_string("spec")
        .or(args.get_string("package"))
        .map(String::as_str);
    let spec = ops::pkgid(&ws, spec)?;
    drop_println!(config, "{spec}");
    Ok(())
}
