pub use self::dependency::DepKind;
pub use self::manifest::{Package, TomlManifest};
pub use self::package_id::PackageId;
pub use self::package_id_spec::PackageIdSpec;
pub use self::resolve::{LockedPackage, Resolve};
pub use self::shell::{Shell, Verbosity};
pub use self::source_id::{SourceId, SourceKind};
pub use self::workspace::Workspace;

pub mod dependency;
pub mod manifest;
pub mod package_id;
pub mod package_id_spec;
pub mod resolve;
pub mod shell;
pub mod source_id;
pub mod workspace;
