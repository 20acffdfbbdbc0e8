use hoist::util::command_prelude::*;

pub fn builtin() -> Vec<Command> {
    vec![
        add::cli(),
        bench::cli(),
        clean::cli(),
        fetch::cli(),
        info::cli(),
        login::cli(),
        logout::cli(),
        owner::cli(),
        pkgid::cli(),
        publish::cli(),
        remove::cli(),
        rustdoc::cli(),
        search::cli(),
        test::cli(),
        uninstall::cli(),
    ]
}

pub type Exec = fn(&mut Config, &ArgMatches) -> CliResult;

pub fn builtin_exec(cmd: &str) -> Option<Exec> {
    let f = match cmd {
        "add" => add::exec,
        "bench" => bench::exec,
        "clean" => clean::exec,
        "fetch" => fetch::exec,
        "info" => info::exec,
        "login" => login::exec,
        "logout" => logout::exec,
        "owner" => owner::exec,
        "pkgid" => pkgid::exec,
        "publish" => publish::exec,
        "remove" => remove::exec,
        "rustdoc" => rustdoc::exec,
        "search" => search::exec,
        "test" => test::exec,
        "uninstall" => uninstall::exec,
        _ => return None,
    };
    Some(f)
}

pub mod add;
pub mod bench;
pub mod clean;
pub mod fetch;
pub mod info;
pub mod login;
pub mod logout;
pub mod owner;
pub mod pkgid;
pub mod publish;
pub mod remove;
pub mod rustdoc;
pub mod search;
pub mod test;
pub mod uninstall;
