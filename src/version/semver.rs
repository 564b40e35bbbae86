use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::error::ParseError;

/// A `MAJOR.MINOR.PATCH[-prerelease][+build]` version.
///
/// Equality, hashing and ordering ignore `build` entirely. A prerelease sorts
/// before the release with the same major.minor.patch, and two prereleases are
/// compared as plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

/// Parse a version string in canonical semver grammar.
///
/// No partial versions and no `v` prefix: the whole string must match.
///
/// Examples:
/// - "1.2.3" -> 1.2.3
/// - "1.0.0-rc.1+build.5" -> 1.0.0 with prerelease "rc.1" and build "build.5"
/// - "1.2" -> ParseError
pub fn parse_version(text: &str) -> Result<SemanticVersion, ParseError> {
    let parsed = semver::Version::parse(text).map_err(|e| ParseError::new(text, e.to_string()))?;

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    Ok(SemanticVersion {
        major: parsed.major,
        minor: parsed.minor,
        patch: parsed.patch,
        prerelease: non_empty(parsed.pre.as_str()),
        build: non_empty(parsed.build.as_str()),
    })
}

/// Canonical re-serialization, the inverse of [`parse_version`].
pub fn version_to_string(version: &SemanticVersion) -> String {
    version.to_string()
}

/// Total order over versions; build metadata never participates.
pub fn compare_versions(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| match (&a.prerelease, &b.prerelease) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(y),
        })
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_version(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(value: SemanticVersion) -> Self {
        value.to_string()
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        compare_versions(self, other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(self, other)
    }
}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}
