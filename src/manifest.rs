//! JSON manifest describing a registry: configuration, version records and mocks
//!
//! ```json
//! {
//!   "config": { "strictMode": true, "hostFrameworkVersion": "18.2.0" },
//!   "versions": {
//!     "toast": [{ "version": "1.0.0", "compatibilityMatrix": { "framework": { "min": "18.0.0" } } }]
//!   },
//!   "mocks": [
//!     { "name": "toast", "metadata": { "type": "provider", "dependencies": ["theme"] } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::registry::MockRegistry;
use crate::registry::entry::{ImplementationHandle, PartialMockConfiguration, PartialMockMetadata};
use crate::registry::error::RegistryError;
use crate::version::types::MockVersionRecord;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to register {mock}: {reasons}")]
    Registration { mock: String, reasons: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub config: RegistryConfig,
    /// Version records per mock name
    pub versions: BTreeMap<String, Vec<MockVersionRecord>>,
    /// Mocks, registered in the listed order
    pub mocks: Vec<ManifestMock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestMock {
    pub name: String,
    /// Reference to the implementation (module path, fixture name, ...);
    /// defaults to the mock name
    #[serde(default)]
    pub implementation: Option<String>,
    #[serde(default)]
    pub metadata: PartialMockMetadata,
    #[serde(default)]
    pub configuration: Option<PartialMockConfiguration>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        debug!("Reading manifest {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build a registry, registering version records before mocks so the
    /// registration self-check can see them.
    ///
    /// Stops at the first mock whose registration fails.
    pub fn into_registry(self) -> Result<MockRegistry, ManifestError> {
        let mut registry = MockRegistry::new(self.config);

        for (name, records) in self.versions {
            for record in records {
                registry.register_version(&name, record)?;
            }
        }

        for mock in self.mocks {
            let implementation =
                ImplementationHandle::new(mock.implementation.unwrap_or_else(|| mock.name.clone()));
            let result =
                registry.register(&mock.name, implementation, mock.metadata, mock.configuration);
            if !result.success {
                return Err(ManifestError::Registration {
                    mock: mock.name,
                    reasons: result
                        .errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                });
            }
        }

        info!(
            "Built registry with {} mock(s) from manifest",
            registry.stats().total
        );
        Ok(registry)
    }
}
