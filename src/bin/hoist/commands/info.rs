use hoist::core::PackageIdSpec;
use hoist::ops;
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("info")
        .about("Display information about a package in the registry")
        .arg(
            Arg::new("package")
                .value_name("SPEC")
                .required(true)
                .help("Package to inspect, as `name` or `name@version`"),
        )
        .arg_registry("Registry to use")
        .arg_index("Registry index URL to use")
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let spec = args
        .get_string("package")
        .map(|s| PackageIdSpec::parse(s))
        .transpose()?
        .expect("required argument");
    let reg_or_index = args.registry_or_index()?;
    ops::info(&spec, config, reg_or_index.as_ref())?;
    Ok(())
}
