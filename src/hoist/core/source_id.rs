use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::bail;
use serde::de;
use serde::ser;
use url::Url;

use crate::util::config::DEFAULT_REGISTRY_API;
use crate::util::HoistResult;

/// Unique identifier for a source of packages.
///
/// Rendered as `<kind>+<url>`, e.g. `registry+https://hoisthub.io` or
/// `path+file:///home/alice/dep`. This string form is what appears in
/// `Hoist.lock` and in fully-qualified package IDs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
    kind: SourceKind,
    url: Url,
}

/// The possible kinds of code source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// A remote registry.
    Registry,
    /// A local path.
    Path,
}

impl SourceId {
    /// Creates a `SourceId` for a registry at `url`.
    pub fn for_registry(url: &Url) -> SourceId {
        SourceId {
            kind: SourceKind::Registry,
            url: url.clone(),
        }
    }

    /// Creates a `SourceId` from a filesystem path.
    pub fn for_path(path: &Path) -> HoistResult<SourceId> {
        let url = Url::from_file_path(path)
            .map_err(|()| anyhow::format_err!("not an absolute path: `{}`", path.display()))?;
        Ok(SourceId {
            kind: SourceKind::Path,
            url,
        })
    }

    /// The default registry source.
    pub fn default_registry() -> SourceId {
        let url = Url::parse(DEFAULT_REGISTRY_API).expect("default registry url is valid");
        SourceId::for_registry(&url)
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_registry(&self) -> bool {
        self.kind == SourceKind::Registry
    }

    pub fn is_path(&self) -> bool {
        self.kind == SourceKind::Path
    }

    /// Whether this is the default registry.
    pub fn is_default_registry(&self) -> bool {
        self.is_registry() && self.url.as_str().trim_end_matches('/') == DEFAULT_REGISTRY_API
    }

    /// The local path, if this is a path source.
    pub fn local_path(&self) -> Option<std::path::PathBuf> {
        if self.is_path() {
            self.url.to_file_path().ok()
        } else {
            None
        }
    }
}

impl FromStr for SourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<SourceId, anyhow::Error> {
        let Some((kind, url)) = s.split_once('+') else {
            bail!("invalid source `{s}`, expected `<kind>+<url>`");
        };
        let kind = match kind {
            "registry" => SourceKind::Registry,
            "path" => SourceKind::Path,
            other => bail!("unsupported source protocol: {other}"),
        };
        let url = Url::parse(url)
            .map_err(|e| anyhow::format_err!("invalid url `{url}`: {e}"))?;
        Ok(SourceId { kind, url })
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SourceKind::Registry => "registry",
            SourceKind::Path => "path",
        };
        write!(f, "{kind}+{}", self.url)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({self})")
    }
}

impl ser::Serialize for SourceId {
    fn serialize<S: ser::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> de::Deserialize<'de> for SourceId {
    fn deserialize<D: de::Deserializer<'de>>(d: D) -> Result<SourceId, D::Error> {
        let string = String::deserialize(d)?;
        string.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string_form() {
        let id = SourceId::default_registry();
        assert_eq!(id.to_string(), "registry+https://hoisthub.io/");
        let parsed: SourceId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(parsed.is_default_registry());
    }

    #[test]
    fn path_sources() {
        let id = SourceId::for_path(Path::new("/tmp/dep")).unwrap();
        assert!(id.is_path());
        assert_eq!(id.local_path(), Some(std::path::PathBuf::from("/tmp/dep")));
        assert!(SourceId::for_path(Path::new("relative")).is_err());
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!("git+https://example.com/repo".parse::<SourceId>().is_err());
        assert!("hoisthub.io".parse::<SourceId>().is_err());
    }
}
