//! Range matching for declared compatibility constraints
//!
//! A range is either an exact version or an inclusive `min`/`max` window with
//! an optional exclusion list:
//! - `{exact: 1.2.3}` - only 1.2.3 matches; `min`/`max`/`exclude` are ignored
//! - `{min: 1.0.0, max: 2.0.0}` - 1.0.0 <= v <= 2.0.0
//! - `{min: 1.0.0, exclude: [1.3.0]}` - at least 1.0.0, but never 1.3.0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::semver::SemanticVersion;
use crate::version::types::Severity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<SemanticVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<SemanticVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<SemanticVersion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<SemanticVersion>,
}

/// Outcome of matching one version against one range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMatch {
    pub compatible: bool,
    pub severity: Severity,
}

impl RangeMatch {
    const fn compatible() -> Self {
        Self {
            compatible: true,
            severity: Severity::Low,
        }
    }

    const fn incompatible(severity: Severity) -> Self {
        Self {
            compatible: false,
            severity,
        }
    }
}

impl VersionRange {
    /// Range matching any version
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exact(version: SemanticVersion) -> Self {
        Self {
            exact: Some(version),
            ..Default::default()
        }
    }

    pub fn between(min: SemanticVersion, max: SemanticVersion) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn at_least(min: SemanticVersion) -> Self {
        Self {
            min: Some(min),
            ..Default::default()
        }
    }

    pub fn at_most(max: SemanticVersion) -> Self {
        Self {
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn excluding(mut self, version: SemanticVersion) -> Self {
        self.exclude.push(version);
        self
    }

    /// Check a version against this range.
    ///
    /// `exact` short-circuits: equal is compatible, anything else is a
    /// critical mismatch. Otherwise an excluded version is a high-severity
    /// mismatch. `min` and `max` are both evaluated; the result is compatible
    /// only when neither bound is violated, and the severity comes from the
    /// first violated bound (`min` -> critical, then `max` -> high).
    pub fn matches(&self, version: &SemanticVersion) -> RangeMatch {
        if let Some(exact) = &self.exact {
            return if version == exact {
                RangeMatch::compatible()
            } else {
                RangeMatch::incompatible(Severity::Critical)
            };
        }

        if self.exclude.contains(version) {
            return RangeMatch::incompatible(Severity::High);
        }

        let below_min = self.min.as_ref().is_some_and(|min| version < min);
        let above_max = self.max.as_ref().is_some_and(|max| version > max);

        if below_min {
            RangeMatch::incompatible(Severity::Critical)
        } else if above_max {
            RangeMatch::incompatible(Severity::High)
        } else {
            RangeMatch::compatible()
        }
    }
}

/// Free-function form of [`VersionRange::matches`]
pub fn matches(version: &SemanticVersion, range: &VersionRange) -> RangeMatch {
    range.matches(version)
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(exact) = &self.exact {
            return write!(f, "={}", exact);
        }

        let mut parts = Vec::new();
        if let Some(min) = &self.min {
            parts.push(format!(">={}", min));
        }
        if let Some(max) = &self.max {
            parts.push(format!("<={}", max));
        }
        for excluded in &self.exclude {
            parts.push(format!("!={}", excluded));
        }

        if parts.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
