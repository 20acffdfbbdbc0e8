use hoist::ops::{self, HarnessError, TestOptions};
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("bench")
        .about("Run the bench harnesses declared in the manifest")
        .arg(
            Arg::new("BENCHNAME")
                .value_name("BENCHNAME")
                .help("Only run harnesses whose name contains BENCHNAME"),
        )
        .arg(
            Arg::new("args")
                .value_name("ARGS")
                .num_args(0..)
                .last(true)
                .help("Arguments passed through to every harness"),
        )
        ._arg(flag(
            "no-fail-fast",
            "Run all harnesses regardless of failure",
        ))
        .arg_jobs()
        .arg_package("Package to run benchmarks for")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let package = ws.select_package(args.get_string("package").map(String::as_str))?;

    let options = TestOptions {
        jobs: args.jobs()?,
        no_fail_fast: args.flag("no-fail-fast"),
        filter: args.get_string("BENCHNAME").cloned(),
        extra_args: values(args, "args"),
    };
    if let Err(err) = ops::run_benches(&ws, package, &options) {
        let code = err
            .downcast_ref::<HarnessError>()
            .and_then(HarnessError::code)
            .unwrap_or(101);
        return Err(CliError::new(err, code));
    }
    Ok(())
}
