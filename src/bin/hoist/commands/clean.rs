use std::path::PathBuf;

use hoist::ops::{self, CleanOptions};
use hoist::util::command_prelude::*;

pub fn cli() -> Command {
    subcommand("clean")
        .about("Remove artifacts from the target directory")
        ._arg(flag("doc", "Only remove the doc directory"))
        ._arg(
            opt("target-dir", "Directory for all generated artifacts")
                .value_name("DIRECTORY"),
        )
        .arg_dry_run("Display a summary of what would be deleted without deleting anything")
        .arg_manifest_path()
}

pub fn exec(config: &mut Config, args: &ArgMatches) -> CliResult {
    let ws = args.workspace(config)?;
    let options = CleanOptions {
        doc: args.flag("doc"),
        dry_run: args.dry_run(),
        target_dir: args.get_string("target-dir").map(PathBuf::from),
    };
    ops::clean(&ws, &options)?;
    Ok(())
}
