//! Mock entry registry and its dependency graph
//!
//! # Modules
//!
//! - [`entry`]: Metadata, configuration, entries and load results
//! - [`graph`]: Dependency graph with cycle detection and reverse lookups
//! - [`validation`]: Schema validation collaborator and default filling
//! - [`mock_registry`]: The registry itself
//! - [`error`]: `RegistryError` and `ValidationError`

pub mod entry;
pub mod error;
pub mod graph;
pub mod mock_registry;
pub mod validation;

pub use mock_registry::MockRegistry;
