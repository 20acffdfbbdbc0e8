use std::fmt;

use semver::Version;

use crate::core::SourceId;

/// Identifier for a specific version of a package in a specific source.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    name: String,
    version: Version,
    source_id: SourceId,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: Version, source_id: SourceId) -> PackageId {
        PackageId {
            name: name.into(),
            version,
            source_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// The unambiguous spec string, `name@version`.
    pub fn to_spec(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// The form used in the install tracker and lockfile dependency lists:
    /// `name version (source)`.
    pub fn stable_key(&self) -> String {
        format!("{} {} ({})", self.name, self.version, self.source_id)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)?;
        if !self.source_id.is_default_registry() {
            write!(f, " ({})", self.source_id)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageId")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("source", &self.source_id.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_the_default_registry() {
        let id = PackageId::new(
            "serde",
            Version::parse("1.0.210").unwrap(),
            SourceId::default_registry(),
        );
        assert_eq!(id.to_string(), "serde v1.0.210");
        assert_eq!(
            id.stable_key(),
            "serde 1.0.210 (registry+https://hoisthub.io/)"
        );

        let path = SourceId::for_path(std::path::Path::new("/x/dep")).unwrap();
        let id = PackageId::new("dep", Version::parse("0.1.0").unwrap(), path);
        assert_eq!(id.to_string(), "dep v0.1.0 (path+file:///x/dep)");
    }
}
