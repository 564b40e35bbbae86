//! Entry, metadata and configuration types for registered mocks

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::error::RegistryError;
use crate::version::cache::CacheStats;
use crate::version::semver::SemanticVersion;

/// Options merged into a mock's configuration on load
pub type MockOptions = BTreeMap<String, serde_json::Value>;

/// Kind of real dependency a mock stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockType {
    Hook,
    Component,
    Provider,
    Service,
    Utility,
}

impl MockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MockType::Hook => "hook",
            MockType::Component => "component",
            MockType::Provider => "provider",
            MockType::Service => "service",
            MockType::Utility => "utility",
        }
    }
}

/// Metadata as supplied by the caller; missing fields get defaults at
/// registration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialMockMetadata {
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub mock_type: Option<MockType>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl PartialMockMetadata {
    pub fn of_type(mock_type: MockType) -> Self {
        Self {
            mock_type: Some(mock_type),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(dependencies.into_iter().map(Into::into).collect());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validated metadata of a registered mock
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockMetadata {
    pub name: String,
    pub version: SemanticVersion,
    #[serde(rename = "type")]
    pub mock_type: MockType,
    pub description: Option<String>,
    pub author: Option<String>,
    pub dependencies: Vec<String>,
    pub tags: Vec<String>,
}

/// Configuration as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialMockConfiguration {
    pub enabled: Option<bool>,
    pub version_override: Option<String>,
    pub options: Option<MockOptions>,
    pub overrides: Option<BTreeMap<String, serde_json::Value>>,
    pub dependencies: Option<Vec<String>>,
}

impl PartialMockConfiguration {
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Default::default()
        }
    }
}

/// Runtime configuration of a registered mock.
///
/// - `enabled`: a disabled mock refuses to load
/// - `version_override`: replaces `metadata.version` for the registration
///   self-check and [`MockRegistryEntry::effective_version`]
/// - `options`: passed to the implementation; `load` merges its options here
/// - `overrides`: per-member return values the implementation should use
/// - `dependencies`: replaces `metadata.dependencies` for graph edges and
///   dependency loading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockConfiguration {
    pub enabled: bool,
    pub version_override: Option<SemanticVersion>,
    pub options: MockOptions,
    pub overrides: BTreeMap<String, serde_json::Value>,
    pub dependencies: Option<Vec<String>>,
}

impl Default for MockConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            version_override: None,
            options: MockOptions::new(),
            overrides: BTreeMap::new(),
            dependencies: None,
        }
    }
}

/// Opaque handle to the mock implementation supplied at registration
#[derive(Clone)]
pub struct ImplementationHandle(Arc<dyn Any + Send + Sync>);

impl ImplementationHandle {
    pub fn new<T: Any + Send + Sync>(implementation: T) -> Self {
        Self(Arc::new(implementation))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ImplementationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImplementationHandle(..)")
    }
}

#[derive(Debug, Clone)]
pub struct MockRegistryEntry {
    pub metadata: MockMetadata,
    pub configuration: MockConfiguration,
    pub implementation: ImplementationHandle,
    pub is_loaded: bool,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

impl MockRegistryEntry {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn effective_version(&self) -> &SemanticVersion {
        self.configuration
            .version_override
            .as_ref()
            .unwrap_or(&self.metadata.version)
    }

    pub fn effective_dependencies(&self) -> &[String] {
        self.configuration
            .dependencies
            .as_deref()
            .unwrap_or(&self.metadata.dependencies)
    }
}

/// Outcome of `register` and `load`
#[derive(Debug, Clone, PartialEq)]
pub struct MockLoadResult {
    pub mock_name: String,
    pub success: bool,
    pub errors: Vec<RegistryError>,
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl MockLoadResult {
    pub(crate) fn new(mock_name: &str) -> Self {
        Self {
            mock_name: mock_name.to_string(),
            success: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Filter for `list`; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockFilter {
    pub mock_type: Option<MockType>,
    pub enabled: Option<bool>,
    pub loaded: Option<bool>,
    /// Matches entries carrying at least one of these tags
    pub tags: Vec<String>,
}

impl MockFilter {
    pub fn matches(&self, entry: &MockRegistryEntry) -> bool {
        self.mock_type.is_none_or(|t| entry.metadata.mock_type == t)
            && self
                .enabled
                .is_none_or(|enabled| entry.configuration.enabled == enabled)
            && self.loaded.is_none_or(|loaded| entry.is_loaded == loaded)
            && (self.tags.is_empty()
                || self
                    .tags
                    .iter()
                    .any(|tag| entry.metadata.tags.contains(tag)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupOptions {
    /// Unload entries not used within `max_age`
    pub unload_unused: bool,
    pub max_age: Option<Duration>,
    /// Unload every loaded entry
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    pub loaded: usize,
    pub enabled: usize,
    pub by_type: BTreeMap<MockType, usize>,
    pub total_usage: u64,
    pub cache: CacheStats,
}
