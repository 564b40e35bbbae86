//! Registry test utilities

use mock_registry::config::RegistryConfig;
use mock_registry::registry::MockRegistry;
use mock_registry::registry::entry::{
    ImplementationHandle, MockLoadResult, MockType, PartialMockMetadata,
};
use mock_registry::version::range::VersionRange;
use mock_registry::version::semver::{SemanticVersion, parse_version};
use mock_registry::version::types::{CompatibilityMatrix, MockVersionRecord};

pub fn create_registry(strict_mode: bool, auto_load: bool) -> MockRegistry {
    MockRegistry::new(RegistryConfig {
        strict_mode,
        auto_load,
        ..Default::default()
    })
}

/// Register a hook mock whose implementation is its own name
pub fn register_mock(
    registry: &mut MockRegistry,
    name: &str,
    dependencies: &[&str],
) -> MockLoadResult {
    registry.register(
        name,
        ImplementationHandle::new(name.to_string()),
        PartialMockMetadata::of_type(MockType::Hook).depends_on(dependencies.iter().copied()),
        None,
    )
}

pub fn version(text: &str) -> SemanticVersion {
    parse_version(text).unwrap()
}

/// Version record declaring an inclusive framework range
pub fn framework_record(mock_version: &str, min: &str, max: &str) -> MockVersionRecord {
    MockVersionRecord::new(
        version(mock_version),
        CompatibilityMatrix {
            framework: VersionRange::between(version(min), version(max)),
            ..Default::default()
        },
    )
}
