use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// A dependency handled by `hoist add` and `hoist remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The name of the dependency (as it is set in its `Hoist.toml` and known
    /// to the registry).
    pub name: String,
    /// Whether the dependency is opted-in with a feature flag.
    pub optional: Option<bool>,
    /// Whether the default features are enabled.
    pub default_features: Option<bool>,
    /// List of features to add (or None to keep features unchanged).
    pub features: Option<BTreeSet<String>>,
    /// Where the dependency comes from.
    pub source: Option<Source>,
    /// Non-default registry.
    pub registry: Option<String>,
    /// If the dependency is renamed, this is the new name for the dependency
    /// as a string. None if it is not renamed.
    pub rename: Option<String>,
}

impl Dependency {
    /// Create a new dependency with a name.
    pub fn new(name: &str) -> Dependency {
        Dependency {
            name: name.to_string(),
            optional: None,
            default_features: None,
            features: None,
            source: None,
            registry: None,
            rename: None,
        }
    }

    /// Set the source of the dependency.
    pub fn set_source(mut self, source: impl Into<Source>) -> Dependency {
        self.source = Some(source.into());
        self
    }

    /// Set whether the dependency is optional.
    pub fn set_optional(mut self, opt: bool) -> Dependency {
        self.optional = Some(opt);
        self
    }

    /// Set features as an array of string (does not format arrays like
    /// `serde/derive`).
    pub fn set_features(mut self, features: BTreeSet<String>) -> Dependency {
        self.features = Some(features);
        self
    }

    /// Set whether the dependency brings in its default features.
    pub fn set_default_features(mut self, default_features: bool) -> Dependency {
        self.default_features = Some(default_features);
        self
    }

    /// Set the alias for the dependency.
    pub fn set_rename(mut self, rename: &str) -> Dependency {
        self.rename = Some(rename.to_string());
        self
    }

    /// Set the registry for the dependency.
    pub fn set_registry(mut self, registry: &str) -> Dependency {
        self.registry = Some(registry.to_string());
        self
    }

    /// Get the dependency source.
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Get the name the dependency is keyed by in a dependency table.
    pub fn toml_key(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    /// The version requirement, if the dependency has one.
    pub fn version(&self) -> Option<&str> {
        match self.source()? {
            Source::Registry(src) => Some(&src.version),
            Source::Path(src) => src.version.as_deref(),
        }
    }

    /// Convert the dependency to a TOML table item, using a simple string
    /// assignment where possible.
    pub fn to_toml(&self) -> toml_edit::Item {
        let is_simple = self.optional.is_none()
            && self.default_features.is_none()
            && self.features.is_none()
            && self.registry.is_none()
            && self.rename.is_none()
            && matches!(self.source(), Some(Source::Registry(_)));
        if is_simple {
            let version = self.version().unwrap();
            return toml_edit::value(version);
        }

        let mut table = toml_edit::InlineTable::default();
        match self.source() {
            Some(Source::Registry(src)) => {
                table.insert("version", src.version.as_str().into());
            }
            Some(Source::Path(src)) => {
                table.insert("path", src.path.display().to_string().into());
                if let Some(version) = &src.version {
                    table.insert("version", version.as_str().into());
                }
            }
            None => {}
        }
        if self.rename.is_some() {
            table.insert("package", self.name.as_str().into());
        }
        if let Some(registry) = &self.registry {
            table.insert("registry", registry.as_str().into());
        }
        if let Some(default_features) = self.default_features {
            if !default_features {
                table.insert("default-features", false.into());
            }
        }
        if let Some(features) = &self.features {
            let features = features
                .iter()
                .map(|s| s.as_str())
                .collect::<toml_edit::Array>();
            table.insert("features", toml_edit::Value::Array(features));
        }
        if let Some(optional) = self.optional {
            if optional {
                table.insert("optional", true.into());
            }
        }
        table.set_dotted(false);
        toml_edit::Item::Value(toml_edit::Value::InlineTable(table))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version() {
            Some(version) => write!(f, "{}@{version}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Where a dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A registry dependency with a version requirement.
    Registry(RegistrySource),
    /// A path dependency.
    Path(PathSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySource {
    /// Version requirement.
    pub version: String,
}

impl RegistrySource {
    pub fn new(version: impl Into<String>) -> RegistrySource {
        RegistrySource {
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSource {
    /// The path, as it will be written to the manifest.
    pub path: PathBuf,
    /// Version requirement for when the package is published.
    pub version: Option<String>,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> PathSource {
        PathSource {
            path: path.into(),
            version: None,
        }
    }
}

impl From<RegistrySource> for Source {
    fn from(src: RegistrySource) -> Source {
        Source::Registry(src)
    }
}

impl From<PathSource> for Source {
    fn from(src: PathSource) -> Source {
        Source::Path(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_dep_is_a_string() {
        let dep = Dependency::new("serde").set_source(RegistrySource::new("1.0.210"));
        let item = dep.to_toml();
        assert_eq!(item.as_str(), Some("1.0.210"));
    }

    #[test]
    fn rich_dep_is_an_inline_table() {
        let dep = Dependency::new("serde")
            .set_source(RegistrySource::new("1.0.210"))
            .set_default_features(false)
            .set_features(["derive".to_string()].into_iter().collect());
        let item = dep.to_toml();
        let table = item.as_value().unwrap().as_inline_table().unwrap();
        assert_eq!(table.get("version").unwrap().as_str(), Some("1.0.210"));
        assert_eq!(
            table.get("default-features").unwrap().as_bool(),
            Some(false)
        );
        assert!(table.get("features").unwrap().is_array());
    }

    #[test]
    fn renamed_dep_keys_by_alias() {
        let dep = Dependency::new("tokio")
            .set_source(RegistrySource::new("1"))
            .set_rename("async-runtime");
        assert_eq!(dep.toml_key(), "async-runtime");
        let item = dep.to_toml();
        let table = item.as_value().unwrap().as_inline_table().unwrap();
        assert_eq!(table.get("package").unwrap().as_str(), Some("tokio"));
    }
}
