use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("uninstall")
        .about("Remove binaries installed with hoist")
        .arg(
            Arg::new("spec")
                .value_name("SPEC")
                .num_args(1..)
                .required(true)
                .help("Packages to uninstall, as `name` or `name@version`"),
        )
        ._arg(multi_opt("bin", "NAME", "Only uninstall the binary NAME"))
        ._arg(opt("root", "Directory to uninstall packages from").value_name("DIR"))
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let specs = values(args, "spec");
    let bins = values(args, "bin");
    let root = args.get_string("root").cloned();
    ops::uninstall(config, root, specs, bins)?;
    Ok(())
}
