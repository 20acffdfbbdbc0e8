use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context as _};

use crate::core::{PackageId, SourceId};
use crate::util::edit_distance::closest_msg;
use crate::util::semver_ext::PartialVersion;
use crate::util::HoistResult;

/// Some or all of the data used to identify a package.
///
/// A spec can name a package loosely (`serde`), pin a version (`serde@1.0`,
/// partial versions allowed), or qualify the source too
/// (`registry+https://hoisthub.io#serde@1.0.210`). Specs are how `-p`
/// arguments and `hoist pkgid`/`hoist uninstall` arguments are written.
#[derive(Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct PackageIdSpec {
    name: String,
    version: Option<PartialVersion>,
    source: Option<SourceId>,
}

impl PackageIdSpec {
    /// Parses a spec string and returns a `PackageIdSpec` if the string was valid.
    ///
    /// Both `name@version` and the older `name:version` syntax are accepted.
    pub fn parse(spec: &str) -> HoistResult<PackageIdSpec> {
        if spec.contains("://") {
            return PackageIdSpec::from_qualified(spec)
                .with_context(|| format!("invalid package ID specification: `{spec}`"));
        }
        let mut parts = spec.splitn(2, [':', '@']);
        let name = parts.next().unwrap();
        let version = match parts.next() {
            Some(version) => Some(version.parse::<PartialVersion>()?),
            None => None,
        };
        validate_name(name, spec)?;
        Ok(PackageIdSpec {
            name: name.to_string(),
            version,
            source: None,
        })
    }

    /// Parses a source-qualified spec: `<kind>+<url>#<name>[@<version>]`.
    fn from_qualified(spec: &str) -> HoistResult<PackageIdSpec> {
        let (source, fragment) = match spec.split_once('#') {
            Some((source, fragment)) => (source, Some(fragment)),
            None => (spec, None),
        };
        let source: SourceId = source.parse()?;
        let (name, version) = match fragment {
            Some(fragment) => match fragment.split_once('@') {
                Some((name, version)) => (name, Some(version.parse::<PartialVersion>()?)),
                None => (fragment, None),
            },
            None => {
                // Take the name from the last path segment of the URL.
                let name = source
                    .url()
                    .path_segments()
                    .and_then(|mut s| s.next_back())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        anyhow::format_err!("pkgid urls must have at least one path component")
                    })?;
                (name, None)
            }
        };
        validate_name(name, spec)?;
        Ok(PackageIdSpec {
            name: name.to_string(),
            version,
            source: Some(source),
        })
    }

    /// The spec that unambiguously names `package_id`.
    pub fn from_package_id(package_id: &PackageId) -> PackageIdSpec {
        PackageIdSpec {
            name: package_id.name().to_string(),
            version: Some(package_id.version().clone().into()),
            source: Some(package_id.source_id().clone()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&PartialVersion> {
        self.version.as_ref()
    }

    pub fn source(&self) -> Option<&SourceId> {
        self.source.as_ref()
    }

    /// Checks whether the given `PackageId` matches the `PackageIdSpec`.
    pub fn matches(&self, package_id: &PackageId) -> bool {
        if self.name != package_id.name() {
            return false;
        }
        if let Some(version) = &self.version {
            if !version.matches(package_id.version()) {
                return false;
            }
        }
        match &self.source {
            Some(source) => source == package_id.source_id(),
            None => true,
        }
    }

    /// Checks a list of `PackageId`s to find 1 that matches this spec. If 0, 2, or
    /// more are found, then this returns an error.
    pub fn query<I>(&self, i: I) -> HoistResult<PackageId>
    where
        I: IntoIterator<Item = PackageId>,
    {
        let all: Vec<_> = i.into_iter().collect();
        let mut ids = all.iter().filter(|p| self.matches(p));
        let Some(ret) = ids.next() else {
            let suggestion = closest_msg(&self.name, all.iter(), |id| id.name());
            bail!(
                "package ID specification `{self}` did not match any packages{suggestion}"
            );
        };
        let mut vec = vec![ret];
        vec.extend(ids);
        if vec.len() == 1 {
            return Ok(ret.clone());
        }
        vec.sort_unstable_by_key(|id| id.version().clone());
        let mut msg = format!(
            "There are multiple `{}` packages in your project, and the specification \
             `{}` is ambiguous.\nPlease re-run this command with one of the following \
             specifications:",
            self.name, self
        );
        for id in vec {
            msg.push_str(&format!("\n  {}", id.to_spec()));
        }
        Err(anyhow::format_err!("{msg}"))
    }
}

impl FromStr for PackageIdSpec {
    type Err = anyhow::Error;

    fn from_str(spec: &str) -> HoistResult<PackageIdSpec> {
        PackageIdSpec::parse(spec)
    }
}

impl fmt::Display for PackageIdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => {
                write!(f, "{source}#{}", self.name)?;
            }
            None => {
                write!(f, "{}", self.name)?;
            }
        }
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

fn validate_name(name: &str, spec: &str) -> HoistResult<()> {
    if name.is_empty() {
        bail!("package ID specification `{spec}` is missing a package name");
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        bail!("invalid character in pkgid `{spec}`");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn spec(s: &str) -> PackageIdSpec {
        PackageIdSpec::parse(s).unwrap()
    }

    #[test]
    fn good_parsing() {
        let s = spec("serde");
        assert_eq!(s.name(), "serde");
        assert!(s.version().is_none());
        assert_eq!(s.to_string(), "serde");

        let s = spec("serde@1.0");
        assert_eq!(s.version().unwrap().to_string(), "1.0");
        assert_eq!(s.to_string(), "serde@1.0");

        // Legacy colon syntax normalizes to `@`.
        assert_eq!(spec("serde:1.0"), spec("serde@1.0"));

        let s = spec("registry+https://hoisthub.io#serde@1.0.210");
        assert_eq!(s.name(), "serde");
        assert!(s.source().unwrap().is_registry());
        assert_eq!(
            s.to_string(),
            "registry+https://hoisthub.io/#serde@1.0.210"
        );

        // The name can come from the URL's last path segment.
        let s = spec("path+file:///home/alice/dep");
        assert_eq!(s.name(), "dep");
    }

    #[test]
    fn bad_parsing() {
        assert!(PackageIdSpec::parse("").is_err());
        assert!(PackageIdSpec::parse("foo@1.x").is_err());
        assert!(PackageIdSpec::parse("foo bar").is_err());
        assert!(PackageIdSpec::parse("git+https://example.com#foo").is_err());
    }

    #[test]
    fn queries() {
        let registry = SourceId::default_registry();
        let ids = vec![
            PackageId::new("serde", Version::parse("1.0.210").unwrap(), registry.clone()),
            PackageId::new("serde", Version::parse("0.9.0").unwrap(), registry.clone()),
            PackageId::new("anyhow", Version::parse("1.0.89").unwrap(), registry.clone()),
        ];

        let found = spec("serde@1.0").query(ids.clone()).unwrap();
        assert_eq!(found.version(), &Version::parse("1.0.210").unwrap());

        let err = spec("serde").query(ids.clone()).unwrap_err();
        assert!(err.to_string().contains("is ambiguous"));
        assert!(err.to_string().contains("serde@0.9.0"));

        let err = spec("serd").query(ids).unwrap_err();
        assert!(err.to_string().contains("did not match any packages"));
        assert!(err.to_string().contains("Did you mean `serde`?"));
    }
}
