/// Dependencies can come in three kinds.
#[derive(PartialEq, Eq, Hash, Ord, PartialOrd, Clone, Copy, Debug)]
pub enum DepKind {
    Normal,
    Development,
    Build,
}

impl DepKind {
    /// The name of the manifest table this kind lives in.
    pub fn kind_table(&self) -> &'static str {
        match self {
            DepKind::Normal => "dependencies",
            DepKind::Development => "dev-dependencies",
            DepKind::Build => "build-dependencies",
        }
    }
}
