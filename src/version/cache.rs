//! In-memory memoization of compatibility results and migration paths
//!
//! Entries never expire on their own. They are dropped per mock name when that
//! mock or one of its versions is registered again, or all at once on `clear`.
//! The maps are plain `HashMap`s: the cache must not be shared between threads
//! without an external lock.

use std::collections::HashMap;

use tracing::debug;

use crate::version::semver::SemanticVersion;
use crate::version::types::{CompatibilityResult, MigrationPath};

/// Versions compare and hash without build metadata, so `1.0.0+a` and
/// `1.0.0+b` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompatibilityKey {
    pub mock_name: String,
    pub version: SemanticVersion,
    pub environment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationKey {
    pub mock_name: String,
    pub from_version: SemanticVersion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub compatibility_entries: usize,
    pub migration_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct ResultCache {
    enabled: bool,
    compatibility: HashMap<CompatibilityKey, CompatibilityResult>,
    migrations: HashMap<MigrationKey, MigrationPath>,
    hits: u64,
    misses: u64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ResultCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            compatibility: HashMap::new(),
            migrations: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_compatibility(&mut self, key: &CompatibilityKey) -> Option<CompatibilityResult> {
        if !self.enabled {
            return None;
        }
        let found = self.compatibility.get(key).cloned();
        self.record_lookup(found.is_some());
        found
    }

    pub fn store_compatibility(&mut self, key: CompatibilityKey, result: CompatibilityResult) {
        if self.enabled {
            self.compatibility.insert(key, result);
        }
    }

    pub fn get_migration(&mut self, key: &MigrationKey) -> Option<MigrationPath> {
        if !self.enabled {
            return None;
        }
        let found = self.migrations.get(key).cloned();
        self.record_lookup(found.is_some());
        found
    }

    pub fn store_migration(&mut self, key: MigrationKey, path: MigrationPath) {
        if self.enabled {
            self.migrations.insert(key, path);
        }
    }

    /// Drop every cached result for one mock; other mocks are untouched.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, mock_name: &str) -> usize {
        let before = self.compatibility.len() + self.migrations.len();
        self.compatibility.retain(|key, _| key.mock_name != mock_name);
        self.migrations.retain(|key, _| key.mock_name != mock_name);
        let removed = before - (self.compatibility.len() + self.migrations.len());
        if removed > 0 {
            debug!("Invalidated {} cached result(s) for {}", removed, mock_name);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.compatibility.clear();
        self.migrations.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            compatibility_entries: self.compatibility.len(),
            migration_entries: self.migrations.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}
