use std::ffi::OsString;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command};

use hoist::util::command_prelude::ArgMatchesExt as _;
use hoist::util::edit_distance::closest_msg;
use hoist::util::{CliError, CliResult, Config};
use hoist::{drop_println, version};

use crate::commands;

pub fn main(config: &mut Config) -> CliResult {
    let args = cli().try_get_matches()?;

    if args.get_flag("version") {
        drop_println!(config, "{}", version());
        return Ok(());
    }

    configure(config, &args)?;

    if args.get_flag("list") {
        print_command_list(config)?;
        return Ok(());
    }

    let Some((cmd, subcommand_args)) = args.subcommand() else {
        // No subcommand provided.
        cli().print_help()?;
        return Ok(());
    };

    execute_subcommand(config, cmd, subcommand_args)
}

fn execute_subcommand(config: &mut Config, cmd: &str, subcommand_args: &ArgMatches) -> CliResult {
    if let Some(exec) = commands::builtin_exec(cmd) {
        return exec(config, subcommand_args);
    }
    execute_alias(config, cmd, subcommand_args)
}

/// Handles a subcommand that is not builtin: a builtin shorthand, a
/// user-defined `[alias]`, or a typo.
fn execute_alias(config: &mut Config, cmd: &str, subcommand_args: &ArgMatches) -> CliResult {
    let alias = builtin_aliases(cmd)
        .map(|target| vec![target.to_string()])
        .or(config.alias(cmd)?);

    let Some(mut alias_args) = alias else {
        let mut candidates: Vec<String> = commands::builtin()
            .iter()
            .map(|c| c.get_name().to_string())
            .collect();
        candidates.extend(["rm", "t", "b"].map(String::from));
        let suggestion = closest_msg(cmd, candidates.iter(), |s| s.as_str());
        return Err(CliError::new(
            anyhow!(
                "no such command: `{cmd}`{suggestion}\n\n\t\
                 View all installed commands with `hoist --list`"
            ),
            101,
        ));
    };

    let target = alias_args
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("alias `{cmd}` has an empty definition"))?;
    if commands::builtin_exec(&target).is_none() {
        return Err(CliError::new(
            anyhow!("alias `{cmd}` expands to `{target}`, which is not a hoist command"),
            101,
        ));
    }

    // Re-parse as if the user had typed the expansion.
    let mut argv: Vec<OsString> = vec!["hoist".into()];
    argv.extend(alias_args.drain(..).map(OsString::from));
    if let Some(rest) = subcommand_args.get_many::<OsString>("") {
        argv.extend(rest.cloned());
    }
    let args = cli().try_get_matches_from(argv)?;
    let (cmd, subcommand_args) = args
        .subcommand()
        .ok_or_else(|| anyhow!("alias `{cmd}` did not expand to a subcommand"))?;
    let exec = commands::builtin_exec(cmd).expect("target checked above");
    exec(config, subcommand_args)
}

fn builtin_aliases(cmd: &str) -> Option<&'static str> {
    match cmd {
        "rm" => Some("remove"),
        "t" => Some("test"),
        "b" => Some("bench"),
        _ => None,
    }
}

fn configure(config: &mut Config, args: &ArgMatches) -> CliResult {
    config.configure(
        args.get_count("verbose") as u32,
        args.flag("quiet"),
        args.get_one::<String>("color").map(String::as_str),
        args.flag("frozen"),
        args.flag("locked"),
        args.flag("offline"),
    )?;
    Ok(())
}

fn print_command_list(config: &Config) -> CliResult {
    drop_println!(config, "Installed Commands:");
    for cmd in commands::builtin() {
        let about = cmd.get_about().map(|a| a.to_string()).unwrap_or_default();
        drop_println!(config, "    {:<12} {}", cmd.get_name(), about);
    }
    for (alias, target) in config.aliases()? {
        drop_println!(config, "    {:<12} alias: {}", alias, target.join(" "));
    }
    Ok(())
}

pub fn cli() -> Command {
    Command::new("hoist")
        .allow_external_subcommands(true)
        .disable_version_flag(true)
        .about("A compact, lockfile-driven package manager")
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version info and exit"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List installed commands"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Use verbose output (-vv very verbose output)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Do not print hoist log messages"),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .value_name("WHEN")
                .global(true)
                .help("Coloring: auto, always, never"),
        )
        .arg(
            Arg::new("frozen")
                .long("frozen")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Require Hoist.lock and cache to be up to date"),
        )
        .arg(
            Arg::new("locked")
                .long("locked")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Require Hoist.lock to be up to date"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Run without accessing the network"),
        )
        .subcommands(commands::builtin())
}
