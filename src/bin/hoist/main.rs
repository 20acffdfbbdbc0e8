use std::io::IsTerminal as _;

use hoist::core::Shell;
use hoist::util::Config;

mod cli;
mod commands;

fn main() {
    setup_logger();

    let mut config = match Config::default() {
        Ok(config) => config,
        Err(e) => {
            let mut shell = Shell::new();
            hoist::exit_with_error(e.into(), &mut shell)
        }
    };

    if let Err(e) = cli::main(&mut config) {
        let mut shell = config.shell();
        hoist::exit_with_error(e, &mut shell)
    }
}

fn setup_logger() {
    let env = tracing_subscriber::EnvFilter::from_env("HOIST_LOG");
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_env_filter(env)
        .init();
    tracing::trace!("logging initialized");
}
