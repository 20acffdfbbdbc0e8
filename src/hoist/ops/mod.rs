pub use self::add::{add, AddOptions, DepOp};
pub use self::clean::{clean, CleanOptions};
pub use self::fetch::fetch;
pub use self::lockfile::{load_lockfile, lockfile_required, write_lockfile};
pub use self::pkgid::pkgid;
pub use self::registry::{
    info, modify_owners, publish, registry_login, registry_logout, search, OwnersOptions,
    PublishOpts, RegistryOrIndex,
};
pub use self::remove::{remove, RemoveOptions};
pub use self::run_tests::{run_benches, run_tests, HarnessError, TestOptions};
pub use self::rustdoc::{doc, DocOptions};
pub use self::uninstall::{uninstall, InstallTracker};

mod add;
mod clean;
mod fetch;
mod lockfile;
mod pkgid;
mod registry;
mod remove;
mod run_tests;
mod rustdoc;
mod uninstall;
