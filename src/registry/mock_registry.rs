//! The stateful mock registry: registration, dependency-ordered loading,
//! unloading and queries

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use chrono::Utc;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::registry::entry::{
    CleanupOptions, ImplementationHandle, MockFilter, MockLoadResult, MockOptions,
    MockRegistryEntry, PartialMockConfiguration, PartialMockMetadata, RegistryStats,
};
use crate::registry::error::{RegistryError, ValidationError};
use crate::registry::graph::DependencyGraph;
use crate::registry::validation::{
    DefaultSchemaValidator, SchemaValidator, resolve_configuration, resolve_metadata,
};
use crate::version::catalog::VersionCatalog;
use crate::version::error::ParseError;
use crate::version::semver::SemanticVersion;
use crate::version::types::{
    CompatibilityResult, EnvironmentDescriptor, MigrationPath, MockVersionRecord,
};

/// Registry of mocks for one test harness.
///
/// Construct one per harness and pass it by reference; nothing here is
/// global. All mutation is expected from a single logical thread.
pub struct MockRegistry {
    config: RegistryConfig,
    entries: IndexMap<String, MockRegistryEntry>,
    graph: DependencyGraph,
    catalog: VersionCatalog,
    validator: Box<dyn SchemaValidator>,
    load_events: Vec<String>,
}

impl fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRegistry")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field("graph", &self.graph)
            .field("catalog", &self.catalog)
            .field("load_events", &self.load_events)
            .finish_non_exhaustive()
    }
}

impl MockRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self::build(config, Box::new(DefaultSchemaValidator::new()))
    }

    /// Build a registry with a custom schema validator
    pub fn build(config: RegistryConfig, validator: Box<dyn SchemaValidator>) -> Self {
        let catalog = VersionCatalog::new(config.include_prerelease, config.cache.enabled);
        Self {
            config,
            entries: IndexMap::new(),
            graph: DependencyGraph::new(),
            catalog,
            validator,
            load_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn versions(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    fn debug_step(&self, message: impl FnOnce() -> String) {
        if self.config.features.debug_logging {
            debug!("{}", message());
        }
    }

    // -------------------------------------------------------------------------
    // Version records and compatibility
    // -------------------------------------------------------------------------

    /// Register a version record after validating its compatibility matrix
    pub fn register_version(
        &mut self,
        mock_name: &str,
        record: MockVersionRecord,
    ) -> Result<(), RegistryError> {
        self.validator
            .validate_matrix(&record.compatibility_matrix)
            .map_err(|source| RegistryError::Validation {
                mock: mock_name.to_string(),
                source,
            })?;
        self.catalog.register_version(mock_name, record);
        Ok(())
    }

    pub fn check_compatibility(
        &mut self,
        mock_name: &str,
        mock_version: &str,
        environment: &EnvironmentDescriptor,
    ) -> Result<CompatibilityResult, ParseError> {
        self.debug_step(|| format!("Checking compatibility of {}@{}", mock_name, mock_version));
        self.catalog
            .check_compatibility(mock_name, mock_version, environment)
    }

    pub fn generate_migration_path(
        &mut self,
        mock_name: &str,
        from_version: &str,
    ) -> Result<Option<MigrationPath>, ParseError> {
        self.catalog.generate_migration_path(mock_name, from_version)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register a mock.
    ///
    /// Never panics or returns early with an error: every failure is reported
    /// in the returned result and leaves the registry untouched.
    pub fn register(
        &mut self,
        name: &str,
        implementation: ImplementationHandle,
        metadata: PartialMockMetadata,
        configuration: Option<PartialMockConfiguration>,
    ) -> MockLoadResult {
        let started = Instant::now();
        let mut result = MockLoadResult::new(name);

        match self.try_register(name, implementation, metadata, configuration, &mut result) {
            Ok(()) => result.success = true,
            Err(error) => {
                warn!("Failed to register {}: {}", name, error);
                result.errors.push(error);
            }
        }

        result.elapsed = started.elapsed();
        result
    }

    fn try_register(
        &mut self,
        name: &str,
        implementation: ImplementationHandle,
        metadata: PartialMockMetadata,
        configuration: Option<PartialMockConfiguration>,
        result: &mut MockLoadResult,
    ) -> Result<(), RegistryError> {
        let invalid = |source: ValidationError| RegistryError::Validation {
            mock: name.to_string(),
            source,
        };

        // 1. Defaults and schema
        let metadata = resolve_metadata(name, metadata).map_err(invalid)?;
        let configuration =
            resolve_configuration(configuration.unwrap_or_default()).map_err(invalid)?;
        self.validator
            .validate_metadata(&metadata)
            .map_err(invalid)?;
        self.validator
            .validate_configuration(&configuration)
            .map_err(invalid)?;

        // 2. Self-check against the host framework
        let version = configuration
            .version_override
            .clone()
            .unwrap_or_else(|| metadata.version.clone());
        self.self_check(name, &version, result)?;

        // 3. Dependency graph
        let dependencies = configuration
            .dependencies
            .clone()
            .unwrap_or_else(|| metadata.dependencies.clone());
        if let Some(cycle) = self.graph.would_create_cycle(name, &dependencies) {
            let error = RegistryError::Cycle { cycle };
            if self.config.strict_mode {
                return Err(error);
            }
            warn!("Registering {} despite: {}", name, error);
            result.warnings.push(error.to_string());
        }

        // 4. Commit
        self.graph.set_dependencies(name, &dependencies);

        let now = Utc::now();
        let loaded = self.config.auto_load;
        let entry = MockRegistryEntry {
            metadata,
            configuration,
            implementation,
            is_loaded: loaded,
            usage_count: 0,
            last_used: None,
            loaded_at: loaded.then_some(now),
            registered_at: now,
        };

        if self.entries.insert(name.to_string(), entry).is_some() {
            info!("Re-registered mock {}@{}", name, version);
        } else {
            info!("Registered mock {}@{}", name, version);
        }
        if loaded {
            self.load_events.push(name.to_string());
        }
        let dropped = self.catalog.invalidate(name);
        self.debug_step(|| format!("Dropped {} cached result(s) for {}", dropped, name));

        Ok(())
    }

    fn self_check(
        &mut self,
        name: &str,
        version: &SemanticVersion,
        result: &mut MockLoadResult,
    ) -> Result<(), RegistryError> {
        let Some(host) = self.config.host_framework_version.clone() else {
            return Ok(());
        };
        if !self.catalog.has_version(name, version) {
            self.debug_step(|| format!("No version record for {}@{}; skipping self-check", name, version));
            return Ok(());
        }

        let check = self.catalog.check_compatibility(
            name,
            &version.to_string(),
            &EnvironmentDescriptor::with_framework(host),
        )?;
        if check.compatible {
            return Ok(());
        }

        let error = RegistryError::Incompatible {
            mock: name.to_string(),
            version: version.to_string(),
            reasons: check
                .issues
                .iter()
                .map(|issue| issue.description.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        };
        if self.config.strict_mode {
            return Err(error);
        }
        warn!("{}", error);
        result.warnings.push(error.to_string());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Load / unload
    // -------------------------------------------------------------------------

    /// Load a mock, loading its unloaded dependencies first.
    ///
    /// Dependencies are loaded one at a time, depth-first, so `load_events`
    /// always lists a dependency before its dependent. A failing dependency
    /// does not roll back the ones already loaded; its errors are collected
    /// into this result and the requested mock stays unloaded.
    pub async fn load(&mut self, name: &str, options: Option<MockOptions>) -> MockLoadResult {
        let started = Instant::now();
        let mut in_progress = Vec::new();

        let mut result = self
            .load_recursive(name.to_string(), options, &mut in_progress)
            .await;

        result.elapsed = started.elapsed();
        if result.success {
            info!("Loaded mock {} in {:?}", name, result.elapsed);
        } else {
            warn!(
                "Failed to load mock {}: {} error(s)",
                name,
                result.errors.len()
            );
        }
        result
    }

    fn load_recursive<'a>(
        &'a mut self,
        name: String,
        options: Option<MockOptions>,
        in_progress: &'a mut Vec<String>,
    ) -> BoxFuture<'a, MockLoadResult> {
        Box::pin(async move {
            let started = Instant::now();
            let mut result = MockLoadResult::new(&name);

            let Some(entry) = self.entries.get(&name) else {
                result.errors.push(RegistryError::NotRegistered(name));
                return result;
            };
            if !entry.configuration.enabled {
                result.errors.push(RegistryError::Disabled(name));
                return result;
            }
            let dependencies = entry.effective_dependencies().to_vec();

            in_progress.push(name.clone());
            for dependency in dependencies {
                let state = self.entries.get(&dependency).map(|dep| dep.is_loaded);
                match state {
                    None => result.errors.push(RegistryError::UnresolvedDependency {
                        mock: name.clone(),
                        dependency,
                    }),
                    Some(true) => {}
                    Some(false) if in_progress.contains(&dependency) => {
                        result.warnings.push(format!(
                            "Skipped loading {} from {}: circular dependency",
                            dependency, name
                        ));
                    }
                    Some(false) => {
                        self.debug_step(|| format!("Loading {} for {}", dependency, name));
                        let loaded = self.load_recursive(dependency, None, in_progress).await;
                        result.errors.extend(loaded.errors);
                        result.warnings.extend(loaded.warnings);
                    }
                }
            }
            in_progress.pop();

            if result.errors.is_empty() {
                if let Some(entry) = self.entries.get_mut(&name) {
                    if let Some(options) = options {
                        entry.configuration.options.extend(options);
                    }
                    let newly_loaded = !entry.is_loaded;
                    entry.is_loaded = true;
                    entry.usage_count += 1;
                    entry.loaded_at = Some(Utc::now());
                    if newly_loaded {
                        self.load_events.push(name.clone());
                    }
                    result.success = true;
                }
            }

            result.elapsed = started.elapsed();
            result
        })
    }

    /// Mark a mock unloaded.
    ///
    /// In strict mode this is refused while a loaded mock depends on it.
    /// Entries and graph edges are kept either way.
    pub fn unload(&mut self, name: &str) -> bool {
        if !self.entries.contains_key(name) {
            warn!("Cannot unload {}: not registered", name);
            return false;
        }
        if let Err(error) = self.check_unload_allowed(name) {
            warn!("{}", error);
            return false;
        }

        if let Some(entry) = self.entries.get_mut(name) {
            entry.is_loaded = false;
            entry.loaded_at = None;
        }
        info!("Unloaded mock {}", name);
        true
    }

    /// Remove a mock and its outgoing edges.
    ///
    /// Guarded like [`MockRegistry::unload`]. Mocks that still declare it as a
    /// dependency keep their edge and will report it as unresolved on load.
    pub fn unregister(&mut self, name: &str) -> bool {
        if !self.entries.contains_key(name) {
            return false;
        }
        if let Err(error) = self.check_unload_allowed(name) {
            warn!("{}", error);
            return false;
        }

        self.entries.shift_remove(name);
        self.graph.remove_node(name);
        self.catalog.invalidate(name);
        info!("Unregistered mock {}", name);
        true
    }

    fn check_unload_allowed(&self, name: &str) -> Result<(), RegistryError> {
        if !self.config.strict_mode {
            return Ok(());
        }
        let dependents: Vec<String> = self
            .graph
            .dependents(name)
            .into_iter()
            .filter(|dependent| self.entries.get(*dependent).is_some_and(|e| e.is_loaded))
            .map(str::to_string)
            .collect();

        if dependents.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::UnloadBlocked {
                mock: name.to_string(),
                dependents,
            })
        }
    }

    /// Unload stale entries.
    ///
    /// With `force` every loaded entry is unloaded. With `unload_unused`,
    /// entries last used (or, if never used, loaded) longer than `max_age` ago
    /// are unloaded; without `max_age` only never-used entries are. Graph
    /// edges and metadata are never touched. Returns the unloaded names.
    pub fn cleanup(&mut self, options: &CleanupOptions) -> Vec<String> {
        let now = Utc::now();
        let max_age = options
            .max_age
            .and_then(|age| chrono::Duration::from_std(age).ok());

        let mut unloaded = Vec::new();
        for (name, entry) in self.entries.iter_mut().filter(|(_, e)| e.is_loaded) {
            let stale = options.force
                || (options.unload_unused
                    && match max_age {
                        Some(max_age) => {
                            let reference = entry
                                .last_used
                                .or(entry.loaded_at)
                                .unwrap_or(entry.registered_at);
                            now - reference > max_age
                        }
                        None => entry.last_used.is_none(),
                    });

            if stale {
                entry.is_loaded = false;
                entry.loaded_at = None;
                unloaded.push(name.clone());
            }
        }

        if !unloaded.is_empty() {
            info!("Cleanup unloaded {} mock(s)", unloaded.len());
        }
        unloaded
    }

    /// Drop every entry, edge, load event, version record and cached result
    pub fn reset(&mut self) {
        self.entries.clear();
        self.graph.clear();
        self.load_events.clear();
        self.catalog.clear();
        info!("Registry reset");
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Look up an entry, recording the use (`usage_count`, `last_used`)
    pub fn get(&mut self, name: &str) -> Option<&MockRegistryEntry> {
        let entry = self.entries.get_mut(name)?;
        entry.usage_count += 1;
        entry.last_used = Some(Utc::now());
        Some(entry)
    }

    /// Look up an entry without recording a use
    pub fn peek(&self, name: &str) -> Option<&MockRegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries matching `filter`, in registration order
    pub fn list(&self, filter: &MockFilter) -> Vec<&MockRegistryEntry> {
        self.entries
            .values()
            .filter(|entry| filter.matches(entry))
            .collect()
    }

    /// `name` and everything it transitively depends on, pre-order
    pub fn get_dependency_tree(&self, name: &str) -> Vec<String> {
        if !self.entries.contains_key(name) {
            return Vec::new();
        }
        self.graph.transitive_closure(name)
    }

    /// Registered mocks that declare `name` as a dependency
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.graph
            .dependents(name)
            .into_iter()
            .filter(|dependent| self.entries.contains_key(*dependent))
            .map(str::to_string)
            .collect()
    }

    /// Declared dependencies that were never registered, as
    /// `(mock, dependency)` pairs
    pub fn missing_dependencies(&self) -> Vec<(String, String)> {
        self.entries
            .values()
            .flat_map(|entry| {
                entry
                    .effective_dependencies()
                    .iter()
                    .filter(|dependency| !self.entries.contains_key(*dependency))
                    .map(|dependency| (entry.name().to_string(), dependency.clone()))
            })
            .collect()
    }

    /// Names in the order they became loaded
    pub fn load_events(&self) -> &[String] {
        &self.load_events
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_type = BTreeMap::new();
        for entry in self.entries.values() {
            *by_type.entry(entry.metadata.mock_type).or_insert(0) += 1;
        }

        RegistryStats {
            total: self.entries.len(),
            loaded: self.entries.values().filter(|e| e.is_loaded).count(),
            enabled: self
                .entries
                .values()
                .filter(|e| e.configuration.enabled)
                .count(),
            by_type,
            total_usage: self.entries.values().map(|e| e.usage_count).sum(),
            cache: self.catalog.cache_stats(),
        }
    }
}
