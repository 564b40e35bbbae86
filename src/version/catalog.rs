//! Registered version records per mock, with cached compatibility answers

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::version::cache::{CacheStats, CompatibilityKey, MigrationKey, ResultCache};
use crate::version::checker::evaluate;
use crate::version::error::ParseError;
use crate::version::migration::plan_migration;
use crate::version::semver::{SemanticVersion, parse_version};
use crate::version::types::{
    CompatibilityIssue, CompatibilityResult, EnvironmentDescriptor, IssueCategory, IssueType,
    MigrationPath, MockVersionRecord, Severity,
};

/// Owns every `MockVersionRecord`, keyed by mock name and version.
///
/// Build metadata does not take part in the key, so `1.0.0+a` and `1.0.0+b`
/// address the same record.
#[derive(Debug, Default)]
pub struct VersionCatalog {
    records: HashMap<String, BTreeMap<SemanticVersion, MockVersionRecord>>,
    cache: ResultCache,
    include_prerelease: bool,
}

impl VersionCatalog {
    pub fn new(include_prerelease: bool, cache_enabled: bool) -> Self {
        Self {
            records: HashMap::new(),
            cache: ResultCache::new(cache_enabled),
            include_prerelease,
        }
    }

    /// Register (or overwrite) a version record.
    ///
    /// Returns the record previously stored under the same version, if any.
    /// Cached results for this mock name are dropped either way.
    pub fn register_version(
        &mut self,
        mock_name: &str,
        record: MockVersionRecord,
    ) -> Option<MockVersionRecord> {
        let version = record.version.clone();
        let previous = self
            .records
            .entry(mock_name.to_string())
            .or_default()
            .insert(version.clone(), record);

        if previous.is_some() {
            info!("Replaced version record {}@{}", mock_name, version);
        } else {
            info!("Registered version record {}@{}", mock_name, version);
        }
        self.cache.invalidate(mock_name);
        previous
    }

    pub fn record(&self, mock_name: &str, version: &SemanticVersion) -> Option<&MockVersionRecord> {
        self.records.get(mock_name)?.get(version)
    }

    pub fn has_version(&self, mock_name: &str, version: &SemanticVersion) -> bool {
        self.record(mock_name, version).is_some()
    }

    /// All registered versions of a mock, ascending
    pub fn versions(&self, mock_name: &str) -> Vec<&SemanticVersion> {
        self.records
            .get(mock_name)
            .map(|records| records.keys().collect())
            .unwrap_or_default()
    }

    /// Highest registered version; prereleases only count when enabled
    pub fn latest_version(&self, mock_name: &str) -> Option<&SemanticVersion> {
        self.records
            .get(mock_name)?
            .keys()
            .filter(|v| self.include_prerelease || !v.is_prerelease())
            .max()
    }

    /// Check one registered mock version against an environment.
    ///
    /// Fails only when `mock_version` or a version inside `environment` is not
    /// valid version text. An unknown mock version yields an incompatible
    /// result with a critical version-mismatch issue.
    pub fn check_compatibility(
        &mut self,
        mock_name: &str,
        mock_version: &str,
        environment: &EnvironmentDescriptor,
    ) -> Result<CompatibilityResult, ParseError> {
        let version = SemanticVersion {
            build: None,
            ..parse_version(mock_version)?
        };
        let key = CompatibilityKey {
            mock_name: mock_name.to_string(),
            version: version.clone(),
            environment: environment.cache_key(),
        };

        if let Some(cached) = self.cache.get_compatibility(&key) {
            debug!("Compatibility cache hit for {}@{}", mock_name, version);
            return Ok(cached);
        }

        let mut result = match self.record(mock_name, &version) {
            Some(record) => evaluate(mock_name, record, environment)?,
            None => unknown_version_result(mock_name, &version),
        };

        if result.migration_required {
            result.migration_path = self.migration_for(mock_name, &version);
        }

        self.cache.store_compatibility(key, result.clone());
        Ok(result)
    }

    /// Plan the migration from `from_version` to the latest known version.
    ///
    /// `Ok(None)` when `from_version` is not registered or the mock has no
    /// latest version.
    pub fn generate_migration_path(
        &mut self,
        mock_name: &str,
        from_version: &str,
    ) -> Result<Option<MigrationPath>, ParseError> {
        let version = parse_version(from_version)?;
        Ok(self.migration_for(mock_name, &version))
    }

    pub fn invalidate(&mut self, mock_name: &str) -> usize {
        self.cache.invalidate(mock_name)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every record and cached result
    pub fn clear(&mut self) {
        self.records.clear();
        self.cache.clear();
    }

    fn migration_for(&mut self, mock_name: &str, from: &SemanticVersion) -> Option<MigrationPath> {
        let key = MigrationKey {
            mock_name: mock_name.to_string(),
            from_version: from.clone(),
        };
        if let Some(cached) = self.cache.get_migration(&key) {
            return Some(cached);
        }

        let current = self.record(mock_name, from)?;
        let path = plan_migration(mock_name, current, self.latest_version(mock_name))?;
        self.cache.store_migration(key, path.clone());
        Some(path)
    }
}

fn unknown_version_result(mock_name: &str, version: &SemanticVersion) -> CompatibilityResult {
    let resolution = format!("Register a version record for {}@{}", mock_name, version);
    CompatibilityResult {
        compatible: false,
        issues: vec![CompatibilityIssue {
            issue_type: IssueType::Error,
            category: IssueCategory::VersionMismatch,
            severity: Severity::Critical,
            description: format!("{}@{} is not a registered version", mock_name, version),
            affected_features: vec![mock_name.to_string()],
            resolution: Some(resolution.clone()),
        }],
        recommendations: vec![resolution],
        migration_required: true,
        migration_path: None,
    }
}
