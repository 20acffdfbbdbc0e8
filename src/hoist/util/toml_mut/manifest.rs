use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::core::dependency::DepKind;
use crate::util::paths;
use crate::util::toml_mut::dependency::Dependency;
use crate::util::HoistResult;

/// Dependency table to add or remove a dep from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepTable {
    kind: DepKind,
    target: Option<String>,
}

impl DepTable {
    const KINDS: &'static [DepKind] = &[DepKind::Normal, DepKind::Development, DepKind::Build];

    /// Reference to a `DepKind` table.
    pub fn new(kind: DepKind) -> Self {
        Self { kind, target: None }
    }

    pub fn kind(&self) -> DepKind {
        self.kind
    }

    /// Further restrict the table to a platform-specific `[target]` table.
    pub fn set_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// The full path to the table, as header segments.
    fn to_path(&self) -> Vec<&str> {
        let kind = self.kind.kind_table();
        match &self.target {
            Some(target) => vec!["target", target.as_str(), kind],
            None => vec![kind],
        }
    }

    fn parse(key: &str) -> Option<DepKind> {
        Self::KINDS.iter().copied().find(|k| k.kind_table() == key)
    }
}

impl Default for DepTable {
    fn default() -> Self {
        Self::new(DepKind::Normal)
    }
}

impl From<DepKind> for DepTable {
    fn from(kind: DepKind) -> Self {
        Self::new(kind)
    }
}

/// An editable `Hoist.toml` manifest, preserving formatting and comments.
#[derive(Debug)]
pub struct LocalManifest {
    /// Path to the manifest.
    pub path: PathBuf,
    /// Parsed manifest contents.
    pub data: toml_edit::DocumentMut,
}

impl LocalManifest {
    /// Construct the `LocalManifest` corresponding to the `Path` provided.
    pub fn try_new(path: &Path) -> HoistResult<Self> {
        let contents = paths::read(path)?;
        let data = contents
            .parse::<toml_edit::DocumentMut>()
            .with_context(|| format!("unable to parse `{}`", path.display()))?;
        Ok(LocalManifest {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Write changes back to the file.
    pub fn write(&self) -> HoistResult<()> {
        let contents = self.data.to_string();
        paths::write_atomic(&self.path, contents)
    }

    /// The name of the package, from `[package] name`.
    pub fn package_name(&self) -> Option<&str> {
        self.data
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
    }

    /// Adds (or updates) a dependency in the given table.
    pub fn insert_into_table(&mut self, table: &DepTable, dep: &Dependency) -> HoistResult<()> {
        let key = dep.toml_key();
        let item = dep.to_toml();

        let mut parent = self.data.as_table_mut();
        for segment in table.to_path() {
            parent = parent
                .entry(segment)
                .or_insert_with(toml_edit::table)
                .as_table_mut()
                .with_context(|| {
                    format!("`[{segment}]` in `{}` is not a table", self.path.display())
                })?;
            parent.set_implicit(true);
        }
        parent.insert(key, item);
        parent.set_implicit(false);
        parent.sort_values();
        Ok(())
    }

    /// Removes a dependency from the given table, erroring if it is absent.
    pub fn remove_from_table(&mut self, table: &DepTable, name: &str) -> HoistResult<()> {
        let path = table.to_path();
        let parent = self.get_table_mut(&path);
        match parent {
            Some(parent) if parent.contains_key(name) => {
                parent.remove(name);
                // Remove a now-empty table header entirely.
                if parent.is_empty() {
                    self.remove_table(&path);
                }
                Ok(())
            }
            _ => {
                let table_name = path.join(".");
                anyhow::bail!(
                    "the dependency `{name}` could not be found in `{table_name}`"
                )
            }
        }
    }

    /// All dependency keys in all dependency tables, with the table they
    /// appear in.
    pub fn dependency_keys(&self) -> Vec<(DepTable, String)> {
        let mut out = Vec::new();
        for (table, deps) in self.dependency_tables() {
            for (dep, _) in deps.iter() {
                out.push((table.clone(), dep.to_string()));
            }
        }
        out
    }

    /// The real package name of every dependency, honoring `package = "…"`
    /// renames. This is the name lockfile entries are recorded under.
    pub fn dependency_package_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (_, deps) in self.dependency_tables() {
            for (key, item) in deps.iter() {
                let name = item
                    .as_table_like()
                    .and_then(|t| t.get("package"))
                    .and_then(|p| p.as_str())
                    .unwrap_or(key);
                out.push(name.to_string());
            }
        }
        out
    }

    fn dependency_tables(&self) -> Vec<(DepTable, &dyn toml_edit::TableLike)> {
        let mut out: Vec<(DepTable, &dyn toml_edit::TableLike)> = Vec::new();
        for (key, item) in self.data.iter() {
            if let Some(kind) = DepTable::parse(key) {
                if let Some(table) = item.as_table_like() {
                    out.push((DepTable::new(kind), table));
                }
            } else if key == "target" {
                let Some(targets) = item.as_table_like() else {
                    continue;
                };
                for (target, tables) in targets.iter() {
                    let Some(tables) = tables.as_table_like() else {
                        continue;
                    };
                    for (key, item) in tables.iter() {
                        let Some(kind) = DepTable::parse(key) else {
                            continue;
                        };
                        if let Some(table) = item.as_table_like() {
                            out.push((DepTable::new(kind).set_target(target), table));
                        }
                    }
                }
            }
        }
        out
    }

    fn get_table_mut(&mut self, path: &[&str]) -> Option<&mut toml_edit::Table> {
        let mut parent = self.data.as_table_mut();
        for segment in path {
            parent = parent.get_mut(segment)?.as_table_mut()?;
        }
        Some(parent)
    }

    fn remove_table(&mut self, path: &[&str]) {
        match path {
            [single] => {
                self.data.remove(single);
            }
            [init @ .., last] => {
                if let Some(parent) = self.get_table_mut(init) {
                    parent.remove(last);
                }
            }
            [] => {}
        }
    }
}
