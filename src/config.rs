use serde::Deserialize;

/// Version assigned to mocks registered without one
pub const DEFAULT_MOCK_VERSION: &str = "1.0.0";

/// Registry configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Turns cycles, self-incompatibility and unloading a dependency of a
    /// loaded mock into hard failures
    pub strict_mode: bool,
    /// Host framework version used for the registration self-check
    pub host_framework_version: Option<String>,
    /// Store newly registered entries as loaded
    pub auto_load: bool,
    /// Allow prereleases to be picked as a mock's latest version
    pub include_prerelease: bool,
    pub cache: CacheConfig,
    pub features: FeatureFlags,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            host_framework_version: None,
            auto_load: true,
            include_prerelease: false,
            cache: CacheConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl RegistryConfig {
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Default::default()
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Process-wide feature switches
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    /// Emit per-step debug traces from the registry
    pub debug_logging: bool,
}
