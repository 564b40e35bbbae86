//! Schema validation of mock metadata, configuration and compatibility matrices

#[cfg(test)]
use mockall::automock;

use std::collections::HashSet;

use regex::Regex;

use crate::config::DEFAULT_MOCK_VERSION;
use crate::registry::entry::{
    MockConfiguration, MockMetadata, PartialMockConfiguration, PartialMockMetadata,
};
use crate::registry::error::ValidationError;
use crate::version::range::VersionRange;
use crate::version::semver::parse_version;
use crate::version::types::CompatibilityMatrix;

/// Validation collaborator injected into the registry.
///
/// Implementations fail fast with a descriptive error on the first problem.
#[cfg_attr(test, automock)]
pub trait SchemaValidator: Send + Sync {
    fn validate_metadata(&self, metadata: &MockMetadata) -> Result<(), ValidationError>;

    fn validate_configuration(
        &self,
        configuration: &MockConfiguration,
    ) -> Result<(), ValidationError>;

    fn validate_matrix(&self, matrix: &CompatibilityMatrix) -> Result<(), ValidationError>;
}

/// Built-in schema rules
pub struct DefaultSchemaValidator {
    /// Mock and dependency names: `toast`, `@app/session`, `form.field-v2`
    name_re: Regex,
}

impl DefaultSchemaValidator {
    pub fn new() -> Self {
        Self {
            name_re: Regex::new(r"^[A-Za-z0-9@][A-Za-z0-9@._/-]*$").unwrap(),
        }
    }

    fn check_name(&self, field: &str, name: &str) -> Result<(), ValidationError> {
        if self.name_re.is_match(name) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{:?} is not a valid mock name", name),
            ))
        }
    }

    fn check_dependencies(&self, field: &str, dependencies: &[String]) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for dependency in dependencies {
            self.check_name(field, dependency)?;
            if !seen.insert(dependency) {
                return Err(ValidationError::new(
                    field,
                    format!("{} is listed more than once", dependency),
                ));
            }
        }
        Ok(())
    }

    fn check_range(&self, field: &str, range: &VersionRange) -> Result<(), ValidationError> {
        if let (Some(min), Some(max)) = (&range.min, &range.max) {
            if min > max {
                return Err(ValidationError::new(
                    field,
                    format!("min {} is greater than max {}", min, max),
                ));
            }
        }
        if let Some(exact) = &range.exact {
            if range.exclude.contains(exact) {
                return Err(ValidationError::new(
                    field,
                    format!("exact version {} is also excluded", exact),
                ));
            }
        }
        Ok(())
    }
}

impl Default for DefaultSchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator for DefaultSchemaValidator {
    fn validate_metadata(&self, metadata: &MockMetadata) -> Result<(), ValidationError> {
        self.check_name("name", &metadata.name)?;
        self.check_dependencies("dependencies", &metadata.dependencies)?;

        if metadata.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::new("tags", "tags must not be blank"));
        }
        Ok(())
    }

    fn validate_configuration(
        &self,
        configuration: &MockConfiguration,
    ) -> Result<(), ValidationError> {
        if let Some(dependencies) = &configuration.dependencies {
            self.check_dependencies("configuration.dependencies", dependencies)?;
        }
        if configuration.options.keys().any(|key| key.is_empty()) {
            return Err(ValidationError::new(
                "configuration.options",
                "option names must not be empty",
            ));
        }
        if configuration.overrides.keys().any(|key| key.is_empty()) {
            return Err(ValidationError::new(
                "configuration.overrides",
                "override names must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_matrix(&self, matrix: &CompatibilityMatrix) -> Result<(), ValidationError> {
        self.check_range("compatibilityMatrix.framework", &matrix.framework)?;
        for (field, range) in [
            ("compatibilityMatrix.testRunner", &matrix.test_runner),
            ("compatibilityMatrix.testingLibrary", &matrix.testing_library),
            ("compatibilityMatrix.typescript", &matrix.typescript),
        ] {
            if let Some(range) = range {
                self.check_range(field, range)?;
            }
        }
        for (name, range) in &matrix.dependencies {
            self.check_name("compatibilityMatrix.dependencies", name)?;
            self.check_range("compatibilityMatrix.dependencies", range)?;
        }
        Ok(())
    }
}

/// Fill metadata defaults: version `1.0.0`, no dependencies, no tags.
///
/// The mock type has no default.
pub fn resolve_metadata(
    name: &str,
    partial: PartialMockMetadata,
) -> Result<MockMetadata, ValidationError> {
    let version_text = partial.version.as_deref().unwrap_or(DEFAULT_MOCK_VERSION);
    let version =
        parse_version(version_text).map_err(|e| ValidationError::new("version", e.to_string()))?;
    let mock_type = partial
        .mock_type
        .ok_or_else(|| ValidationError::new("type", "mock type is required"))?;

    Ok(MockMetadata {
        name: name.to_string(),
        version,
        mock_type,
        description: partial.description,
        author: partial.author,
        dependencies: partial.dependencies.unwrap_or_default(),
        tags: partial.tags.unwrap_or_default(),
    })
}

/// Fill configuration defaults: enabled, empty options and overrides.
pub fn resolve_configuration(
    partial: PartialMockConfiguration,
) -> Result<MockConfiguration, ValidationError> {
    let version_override = partial
        .version_override
        .as_deref()
        .map(parse_version)
        .transpose()
        .map_err(|e| ValidationError::new("configuration.versionOverride", e.to_string()))?;

    Ok(MockConfiguration {
        enabled: partial.enabled.unwrap_or(true),
        version_override,
        options: partial.options.unwrap_or_default(),
        overrides: partial.overrides.unwrap_or_default(),
        dependencies: partial.dependencies,
    })
}
