//! A "partial" semver version for package ID specifiers.

use std::fmt;
use std::str::FromStr;

use semver::{Prerelease, Version};

/// A version with optional minor and patch components, as written in a
/// package ID spec (`foo@1`, `foo@1.2`, `foo@1.2.3-beta.1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Option<Prerelease>,
}

impl PartialVersion {
    /// Returns the full version, if all components were specified.
    pub fn to_version(&self) -> Option<Version> {
        Some(Version {
            major: self.major,
            minor: self.minor?,
            patch: self.patch?,
            pre: self.pre.clone().unwrap_or(Prerelease::EMPTY),
            build: Default::default(),
        })
    }

    /// Check if this matches a version, including compatible pre-releases.
    pub fn matches(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }
        if let Some(minor) = self.minor {
            if version.minor != minor {
                return false;
            }
        }
        if let Some(patch) = self.patch {
            if version.patch != patch {
                return false;
            }
        }
        if let Some(pre) = &self.pre {
            if version.pre != *pre {
                return false;
            }
        } else if !version.pre.is_empty() && self.patch.is_some() {
            // `foo@1.2.3` does not match `1.2.3-beta.1`; a pre-release must
            // be named explicitly.
            return false;
        }
        true
    }
}

impl From<Version> for PartialVersion {
    fn from(version: Version) -> Self {
        PartialVersion {
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: (!version.pre.is_empty()).then_some(version.pre),
        }
    }
}

impl FromStr for PartialVersion {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Ok(version) = Version::parse(value) {
            return Ok(version.into());
        }

        let (numbers, pre) = match value.split_once('-') {
            Some((n, p)) => (n, Some(p)),
            None => (value, None),
        };
        let mut parts = numbers.split('.');
        let parse = |part: &str| -> Result<u64, anyhow::Error> {
            part.parse::<u64>()
                .map_err(|_| anyhow::format_err!("cannot parse `{value}` as a version"))
        };
        let major = parse(
            parts
                .next()
                .ok_or_else(|| anyhow::format_err!("cannot parse `{value}` as a version"))?,
        )?;
        let minor = parts.next().map(parse).transpose()?;
        let patch = parts.next().map(parse).transpose()?;
        if parts.next().is_some() {
            anyhow::bail!("cannot parse `{value}` as a version");
        }
        if pre.is_some() && patch.is_none() {
            anyhow::bail!("cannot parse `{value}` as a version: pre-release requires a full version");
        }
        let pre = pre.map(Prerelease::new).transpose()?;
        Ok(PartialVersion {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl fmt::Display for PartialVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for input in ["1", "1.2", "1.2.3", "1.2.3-beta.1"] {
            let v: PartialVersion = input.parse().unwrap();
            assert_eq!(v.to_string(), input);
        }
        assert!("".parse::<PartialVersion>().is_err());
        assert!("1.x".parse::<PartialVersion>().is_err());
        assert!("1.2.3.4".parse::<PartialVersion>().is_err());
        assert!("1.2-beta".parse::<PartialVersion>().is_err());
    }

    #[test]
    fn prefix_matching() {
        let v = |s: &str| Version::parse(s).unwrap();
        let p = |s: &str| s.parse::<PartialVersion>().unwrap();

        assert!(p("1").matches(&v("1.2.3")));
        assert!(p("1.2").matches(&v("1.2.3")));
        assert!(p("1.2.3").matches(&v("1.2.3")));
        assert!(!p("1.3").matches(&v("1.2.3")));
        assert!(!p("2").matches(&v("1.2.3")));
        assert!(p("1.2.3-beta.1").matches(&v("1.2.3-beta.1")));
        assert!(!p("1.2.3").matches(&v("1.2.3-beta.1")));
        // A bare major still matches pre-releases of that major.
        assert!(p("1").matches(&v("1.0.0-alpha")));
    }
}
