//! Shared types for version records, environments and compatibility results

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::range::VersionRange;
use crate::version::semver::SemanticVersion;

/// Companion libraries a mock version may declare a range for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Companion {
    /// Test runner executing the suite (jest, vitest, ...)
    TestRunner,
    /// DOM testing library used to render mocked components
    TestingLibrary,
    /// TypeScript compiler the suite is type-checked with
    TypeScript,
}

impl Companion {
    pub const ALL: [Companion; 3] = [
        Companion::TestRunner,
        Companion::TestingLibrary,
        Companion::TypeScript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Companion::TestRunner => "test_runner",
            Companion::TestingLibrary => "testing_library",
            Companion::TypeScript => "typescript",
        }
    }
}

/// Versions a compatibility check is evaluated against.
///
/// Every dimension is optional; an absent dimension is skipped, never treated
/// as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentDescriptor {
    pub framework: Option<String>,
    pub test_runner: Option<String>,
    pub testing_library: Option<String>,
    pub typescript: Option<String>,
    pub dependencies: BTreeMap<String, String>,
}

impl EnvironmentDescriptor {
    pub fn with_framework(version: impl Into<String>) -> Self {
        Self {
            framework: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn companion(&self, companion: Companion) -> Option<&str> {
        match companion {
            Companion::TestRunner => self.test_runner.as_deref(),
            Companion::TestingLibrary => self.testing_library.as_deref(),
            Companion::TypeScript => self.typescript.as_deref(),
        }
    }

    pub fn set_companion(&mut self, companion: Companion, version: impl Into<String>) {
        let slot = match companion {
            Companion::TestRunner => &mut self.test_runner,
            Companion::TestingLibrary => &mut self.testing_library,
            Companion::TypeScript => &mut self.typescript,
        };
        *slot = Some(version.into());
    }

    /// Canonical text form used as part of result cache keys.
    ///
    /// Dependencies come from a `BTreeMap`, so the output is independent of
    /// insertion order.
    pub fn cache_key(&self) -> String {
        let dim = |v: &Option<String>| v.as_deref().unwrap_or("-").to_string();
        let deps = self
            .dependencies
            .iter()
            .map(|(name, version)| format!("{}@{}", name, version))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "framework={};test_runner={};testing_library={};typescript={};deps=[{}]",
            dim(&self.framework),
            dim(&self.test_runner),
            dim(&self.testing_library),
            dim(&self.typescript),
            deps
        )
    }
}

/// Ranges a mock version declares itself compatible with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompatibilityMatrix {
    pub framework: VersionRange,
    pub test_runner: Option<VersionRange>,
    pub testing_library: Option<VersionRange>,
    pub typescript: Option<VersionRange>,
    pub dependencies: BTreeMap<String, VersionRange>,
}

impl CompatibilityMatrix {
    pub fn companion(&self, companion: Companion) -> Option<&VersionRange> {
        match companion {
            Companion::TestRunner => self.test_runner.as_ref(),
            Companion::TestingLibrary => self.testing_library.as_ref(),
            Companion::TypeScript => self.typescript.as_ref(),
        }
    }
}

/// Immutable description of one released version of a mock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockVersionRecord {
    pub version: SemanticVersion,
    #[serde(default = "Utc::now")]
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub changelog: Vec<String>,
    #[serde(default)]
    pub breaking_changes: Vec<String>,
    #[serde(default)]
    pub deprecations: Vec<String>,
    #[serde(default)]
    pub compatibility_matrix: CompatibilityMatrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_guide: Option<String>,
}

impl MockVersionRecord {
    pub fn new(version: SemanticVersion, compatibility_matrix: CompatibilityMatrix) -> Self {
        Self {
            version,
            release_date: Utc::now(),
            changelog: Vec::new(),
            breaking_changes: Vec::new(),
            deprecations: Vec::new(),
            compatibility_matrix,
            migration_guide: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    BreakingChange,
    Deprecation,
    VersionMismatch,
    DependencyConflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub affected_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub compatible: bool,
    pub issues: Vec<CompatibilityIssue>,
    pub recommendations: Vec<String>,
    pub migration_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_path: Option<MigrationPath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationAction {
    AddressBreakingChanges,
    UpdateDeprecatedUsage,
    BumpVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStep {
    pub action: MigrationAction,
    pub description: String,
    /// The breaking changes or deprecations this step covers
    pub details: Vec<String>,
    pub required: bool,
    pub automated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPath {
    pub from_version: SemanticVersion,
    pub to_version: SemanticVersion,
    pub steps: Vec<MigrationStep>,
    pub estimated_effort: Effort,
    pub automatable: bool,
}
